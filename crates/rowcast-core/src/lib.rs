//! # rowcast-core
//!
//! Grid model and value-extraction contract for the rowcast mapping engine.
//!
//! This crate provides the types the engine consumes:
//! - [`CellValue`] - Stored cell contents (numbers, strings, booleans, errors, formula results)
//! - [`CellAddress`] - Cell addressing for diagnostics
//! - [`Sheet`] and [`Workbook`] - A minimal in-memory grid
//! - [`ValueSource`] and [`EvaluatedCell`] - The narrow read contract the engine maps through
//!
//! ## Example
//!
//! ```rust
//! use rowcast_core::{EvaluatedCell, ValueSource, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.sheet_mut(0).unwrap();
//!
//! sheet.set_value_at(0, 0, "Hello").unwrap();
//! sheet.set_value_at(0, 1, 42.0).unwrap();
//!
//! assert_eq!(workbook.evaluate(0, 0, 1), Some(EvaluatedCell::Number(42.0)));
//! assert_eq!(workbook.evaluate(0, 5, 5), None);
//! ```

pub mod cell;
pub mod error;
pub mod sheet;
pub mod workbook;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellValue};
pub use error::{Error, Result};
pub use sheet::{Cell, Sheet};
pub use workbook::{datetime_to_serial, serial_to_datetime, EvaluatedCell, ValueSource, Workbook};

/// Maximum number of rows in a sheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
