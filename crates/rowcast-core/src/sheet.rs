//! Sheet type and sparse cell storage

use ahash::AHashMap;
use chrono::NaiveDateTime;

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::workbook::datetime_to_serial;
use crate::{MAX_COLS, MAX_ROWS};

/// A single stored cell: its value plus the number-format classification
/// the engine needs to tell dates apart from plain numbers.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    /// The cell's value
    pub value: CellValue,
    /// Whether the cell carries a date number format
    pub date_format: bool,
}

impl Cell {
    /// Create a new cell with a value and no date format
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            date_format: false,
        }
    }
}

/// A sheet: a sparse grid of cells
///
/// Only cells that have been written are stored. Reads outside the
/// written area return `None` rather than failing.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Sheet name
    name: String,
    /// Sparse cell storage keyed by (row, col)
    cells: AHashMap<(u32, u16), Cell>,
}

impl Sheet {
    /// Create a new sheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: AHashMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Set a cell value by row and column indices
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        self.validate_position(row, col)?;
        self.cells.insert((row, col), Cell::new(value.into()));
        Ok(())
    }

    /// Store a date as its 1900-system serial with the date format flag set
    pub fn set_date_at(&mut self, row: u32, col: u16, when: NaiveDateTime) -> Result<()> {
        self.validate_position(row, col)?;
        self.cells.insert(
            (row, col),
            Cell {
                value: CellValue::Number(datetime_to_serial(when)),
                date_format: true,
            },
        );
        Ok(())
    }

    /// Store a formula together with its cached result
    pub fn set_formula_result<S: Into<String>>(
        &mut self,
        row: u32,
        col: u16,
        text: S,
        result: CellValue,
    ) -> Result<()> {
        self.validate_position(row, col)?;
        self.cells.insert(
            (row, col),
            Cell::new(CellValue::formula_with_result(text, result)),
        );
        Ok(())
    }

    /// Mark an existing cell as date-formatted
    pub fn set_date_format(&mut self, row: u32, col: u16, date_format: bool) {
        if let Some(cell) = self.cells.get_mut(&(row, col)) {
            cell.date_format = date_format;
        }
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn validate_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sparse_reads() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_value_at(2, 3, "x").unwrap();

        assert!(sheet.cell_at(0, 0).is_none());
        assert_eq!(sheet.cell_at(2, 3).unwrap().value, CellValue::text("x"));
        assert_eq!(sheet.cell_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_write() {
        let mut sheet = Sheet::new("Sheet1");
        assert!(sheet.set_value_at(crate::MAX_ROWS, 0, 1.0).is_err());
        assert!(sheet.set_value_at(0, crate::MAX_COLS, 1.0).is_err());
    }

    #[test]
    fn test_date_cell_sets_flag() {
        let mut sheet = Sheet::new("Sheet1");
        let when = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        sheet.set_date_at(0, 0, when).unwrap();

        let cell = sheet.cell_at(0, 0).unwrap();
        assert!(cell.date_format);
        assert!(matches!(cell.value, CellValue::Number(_)));
    }
}
