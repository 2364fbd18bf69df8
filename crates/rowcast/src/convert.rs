//! Cell value conversion
//!
//! Coerces an extracted scalar into the property kind a cell declares.
//! Conversion failures are always recoverable: they carry the sheet and
//! cell they came from and are recorded, never thrown.

use chrono::{NaiveDate, NaiveDateTime};
use rowcast_core::CellAddress;
use thiserror::Error;

use crate::data::DataValue;
use crate::extract::CellScalar;
use crate::schema::PropertyKind;

/// Default render/parse format for date properties
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest f64 that still holds exact integers
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0; // 2^53

/// A failed coercion, identifying the cell and the two types involved
#[derive(Debug, Clone, PartialEq, Error)]
#[error("sheet {sheet} cell {address}: cannot convert {found} to {expected}: {detail}")]
pub struct ConvertError {
    /// Sheet index the cell came from
    pub sheet: usize,
    /// Cell the value came from
    pub address: CellAddress,
    /// Natural type of the extracted value
    pub found: &'static str,
    /// Declared property kind
    pub expected: PropertyKind,
    /// What went wrong
    pub detail: String,
}

impl ConvertError {
    fn new(
        sheet: usize,
        address: CellAddress,
        found: &'static str,
        expected: PropertyKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            sheet,
            address,
            found,
            expected,
            detail: detail.into(),
        }
    }
}

/// Coerce an extracted scalar to the declared property kind.
///
/// A `None` scalar converts to null for every kind, so blank cells assign
/// without complaint. `format` is the cell's date format hint.
pub fn convert(
    scalar: Option<CellScalar>,
    kind: PropertyKind,
    format: Option<&str>,
    sheet: usize,
    address: CellAddress,
) -> Result<DataValue, ConvertError> {
    let Some(scalar) = scalar else {
        return Ok(DataValue::Null);
    };
    let found = scalar.type_name();
    let fail = |detail: String| ConvertError::new(sheet, address, found, kind, detail);

    match (scalar, kind) {
        (CellScalar::Boolean(b), PropertyKind::Any | PropertyKind::Bool) => Ok(b.into()),
        (CellScalar::Boolean(b), PropertyKind::Int) => Ok(DataValue::Int(b.into())),
        (CellScalar::Boolean(b), PropertyKind::Float) => {
            Ok(DataValue::Float(if b { 1.0 } else { 0.0 }))
        }
        (CellScalar::Boolean(b), PropertyKind::Text) => {
            Ok(DataValue::Text(if b { "true" } else { "false" }.into()))
        }
        (CellScalar::Boolean(_), PropertyKind::Date) => {
            Err(fail("a boolean has no date form".into()))
        }

        (CellScalar::Number(n), PropertyKind::Any) => {
            if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
                Ok(DataValue::Int(n as i64))
            } else {
                Ok(DataValue::Float(n))
            }
        }
        (CellScalar::Number(n), PropertyKind::Int) => {
            if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
                Ok(DataValue::Int(n as i64))
            } else {
                Err(fail(format!("{n} is not an integral value")))
            }
        }
        (CellScalar::Number(n), PropertyKind::Float) => Ok(DataValue::Float(n)),
        (CellScalar::Number(n), PropertyKind::Bool) => Ok(DataValue::Bool(n != 0.0)),
        (CellScalar::Number(n), PropertyKind::Text) => {
            Ok(DataValue::Text(CellScalar::Number(n).display_text()))
        }
        (CellScalar::Number(n), PropertyKind::Date) => {
            Err(fail(format!("{n} is a plain number, not a date-formatted cell")))
        }

        (CellScalar::Date(d), PropertyKind::Any | PropertyKind::Date) => Ok(d.into()),
        (CellScalar::Date(d), PropertyKind::Text) => {
            Ok(DataValue::Text(d.format(format.unwrap_or(DEFAULT_DATE_FORMAT)).to_string()))
        }
        (CellScalar::Date(_), kind_) => {
            Err(fail(format!("a date does not coerce to {kind_}")))
        }

        (CellScalar::Text(s), PropertyKind::Any | PropertyKind::Text) => Ok(DataValue::Text(s)),
        (CellScalar::Text(s), PropertyKind::Int) => s
            .trim()
            .parse::<i64>()
            .map(DataValue::Int)
            .map_err(|e| fail(format!("'{s}': {e}"))),
        (CellScalar::Text(s), PropertyKind::Float) => s
            .trim()
            .parse::<f64>()
            .map(DataValue::Float)
            .map_err(|e| fail(format!("'{s}': {e}"))),
        (CellScalar::Text(s), PropertyKind::Bool) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(DataValue::Bool(true)),
            "false" | "no" | "0" => Ok(DataValue::Bool(false)),
            _ => Err(fail(format!("'{s}' is not a boolean"))),
        },
        (CellScalar::Text(s), PropertyKind::Date) => parse_date_text(s.trim(), format)
            .map(DataValue::DateTime)
            .ok_or_else(|| fail(format!("'{s}' does not parse as a date"))),
    }
}

/// Parse text into a date-time using the format hint, falling back to the
/// default date-time and date-only shapes.
fn parse_date_text(s: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    if let Some(fmt) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DEFAULT_DATE_FORMAT) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
