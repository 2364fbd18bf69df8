//! Workbook type and the value-extraction contract

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::cell::CellValue;
use crate::sheet::Sheet;

/// The evaluated contents of one cell, as seen by a consumer that does not
/// care about storage details or formula text.
///
/// Numeric cells carrying a date number format are classified as [`Date`]
/// rather than [`Number`].
///
/// [`Date`]: EvaluatedCell::Date
/// [`Number`]: EvaluatedCell::Number
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluatedCell {
    /// Present but empty cell
    Blank,
    /// Boolean value
    Boolean(bool),
    /// Plain numeric value
    Number(f64),
    /// Date-formatted numeric value, decoded from its serial
    Date(NaiveDateTime),
    /// Text value
    Text(String),
    /// Error cell, or a formula whose result is unavailable
    Error,
}

/// Narrow read contract consumed by the mapping engine.
///
/// Implementations must be total: any out-of-range sheet, row, or column
/// returns `None` instead of failing.
pub trait ValueSource {
    /// Number of sheets available
    fn sheet_count(&self) -> usize;

    /// Evaluated contents of one cell. `None` when the sheet, row, or cell
    /// is absent.
    fn evaluate(&self, sheet: usize, row: u32, col: u16) -> Option<EvaluatedCell>;
}

/// A workbook: an ordered collection of sheets
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a new workbook with one empty sheet
    pub fn new() -> Self {
        let mut wb = Self { sheets: Vec::new() };
        wb.add_sheet("Sheet1");
        wb
    }

    /// Create an empty workbook with no sheets
    pub fn empty() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Add a new sheet, returning its index
    pub fn add_sheet<S: Into<String>>(&mut self, name: S) -> usize {
        self.sheets.push(Sheet::new(name));
        self.sheets.len() - 1
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a mutable sheet by index
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }
}

impl ValueSource for Workbook {
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn evaluate(&self, sheet: usize, row: u32, col: u16) -> Option<EvaluatedCell> {
        let cell = self.sheets.get(sheet)?.cell_at(row, col)?;

        let evaluated = match cell.value.effective_value() {
            CellValue::Empty => EvaluatedCell::Blank,
            CellValue::Boolean(b) => EvaluatedCell::Boolean(*b),
            CellValue::Number(n) if cell.date_format => match serial_to_datetime(*n) {
                Some(when) => EvaluatedCell::Date(when),
                None => EvaluatedCell::Error,
            },
            CellValue::Number(n) => EvaluatedCell::Number(*n),
            CellValue::Text(s) => EvaluatedCell::Text(s.clone()),
            CellValue::Error(_) => EvaluatedCell::Error,
            // Formula with no cached result: nothing usable to report.
            CellValue::Formula { .. } => EvaluatedCell::Error,
        };
        Some(evaluated)
    }
}

/// Base date of the Excel 1900 serial system (serial 1 == 1900-01-01).
fn serial_base() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).expect("valid epoch")
}

/// Decode an Excel 1900-system serial into a date-time.
///
/// Serial 60 is the fictional 1900-02-29; serials at or past it are shifted
/// down by one day so real dates line up with the Gregorian calendar.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.floor() as i64;
    let fraction = serial - days as f64;

    let adjusted = if days >= 60 { days - 1 } else { days };
    let mut date = serial_base().checked_add_signed(Duration::days(adjusted))?;

    let mut total_seconds = (fraction * 86_400.0).round() as u32;
    if total_seconds >= 86_400 {
        date = date.checked_add_signed(Duration::days(1))?;
        total_seconds = 0;
    }
    let (hours, rest) = (total_seconds / 3600, total_seconds % 3600);
    date.and_hms_opt(hours, rest / 60, rest % 60)
}

/// Encode a date-time as an Excel 1900-system serial.
pub fn datetime_to_serial(when: NaiveDateTime) -> f64 {
    let days = (when.date() - serial_base()).num_days();
    let days = if days >= 60 { days + 1 } else { days };
    let seconds =
        when.hour() as i64 * 3600 + when.minute() as i64 * 60 + when.second() as i64;
    days as f64 + seconds as f64 / 86_400.0
}
