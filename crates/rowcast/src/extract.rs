//! Cell value extraction
//!
//! Projects one evaluated cell into the scalar union the converter works
//! on. Every failure mode degrades to `None`; extraction itself never
//! raises an error.

use chrono::NaiveDateTime;
use rowcast_core::{CellAddress, EvaluatedCell, ValueSource};
use tracing::trace;

/// A scalar pulled out of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellScalar {
    /// Boolean cell
    Boolean(bool),
    /// Plain numeric cell
    Number(f64),
    /// Date-formatted numeric cell
    Date(NaiveDateTime),
    /// Text cell
    Text(String),
}

impl CellScalar {
    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellScalar::Boolean(_) => "boolean",
            CellScalar::Number(_) => "number",
            CellScalar::Date(_) => "date",
            CellScalar::Text(_) => "text",
        }
    }

    /// Render the scalar the way it would display in a cell.
    ///
    /// Integral numbers drop their fractional zero so sentinel comparison
    /// sees "3", not "3.0".
    pub fn display_text(&self) -> String {
        match self {
            CellScalar::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellScalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellScalar::Number(n) => format!("{}", n),
            CellScalar::Date(d) => d.to_string(),
            CellScalar::Text(s) => s.clone(),
        }
    }

    /// Check if the scalar is effectively blank text
    pub fn is_blank_text(&self) -> bool {
        matches!(self, CellScalar::Text(s) if s.trim().is_empty())
    }
}

/// Evaluate one cell and project it to a scalar.
///
/// Absent cells, blank cells, error cells, and unreadable formula results
/// all come back as `None`.
pub fn extract<S: ValueSource + ?Sized>(
    source: &S,
    sheet: usize,
    row: u32,
    col: u16,
) -> Option<CellScalar> {
    match source.evaluate(sheet, row, col) {
        None => {
            trace!(sheet, cell = %CellAddress::new(row, col), "cell absent");
            None
        }
        Some(EvaluatedCell::Blank) => None,
        Some(EvaluatedCell::Error) => {
            trace!(sheet, cell = %CellAddress::new(row, col), "unreadable cell");
            None
        }
        Some(EvaluatedCell::Boolean(b)) => Some(CellScalar::Boolean(b)),
        Some(EvaluatedCell::Number(n)) => Some(CellScalar::Number(n)),
        Some(EvaluatedCell::Date(d)) => Some(CellScalar::Date(d)),
        Some(EvaluatedCell::Text(s)) => Some(CellScalar::Text(s)),
    }
}
