//! Output data graph

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// A node in the output graph produced by a read.
///
/// Blocks without a target schema materialize as string-keyed [`Record`]s;
/// loop blocks collect their iterations into a [`List`]. The graph is owned
/// by the caller once a read completes.
///
/// [`Record`]: DataValue::Record
/// [`List`]: DataValue::List
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Absent / unset value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Date-time value
    DateTime(NaiveDateTime),
    /// Text value
    Text(String),
    /// Ordered collection (loop block iterations)
    List(Vec<DataValue>),
    /// String-keyed record
    Record(BTreeMap<String, DataValue>),
}

impl DataValue {
    /// Create an empty record
    pub fn record() -> Self {
        DataValue::Record(BTreeMap::new())
    }

    /// Create an empty list
    pub fn list() -> Self {
        DataValue::List(Vec::new())
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a float (integers widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Float(n) => Some(*n),
            DataValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a date-time
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            DataValue::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get the value as a list
    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the value as a record
    pub fn as_record(&self) -> Option<&BTreeMap<String, DataValue>> {
        match self {
            DataValue::Record(map) => Some(map),
            _ => None,
        }
    }

    /// Get a record field by name
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.as_record()?.get(name)
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "bool",
            DataValue::Int(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::DateTime(_) => "datetime",
            DataValue::Text(_) => "text",
            DataValue::List(_) => "list",
            DataValue::Record(_) => "record",
        }
    }

    /// Convert into a `serde_json::Value` for bridging into typed structs
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for DataValue {
    fn default() -> Self {
        DataValue::Null
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(n) => write!(f, "{}", n),
            DataValue::Float(n) => write!(f, "{}", n),
            DataValue::DateTime(d) => write!(f, "{}", d),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            DataValue::Record(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<i32> for DataValue {
    fn from(n: i32) -> Self {
        DataValue::Int(n as i64)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        DataValue::Int(n)
    }
}

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        DataValue::Float(n)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.into())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(d: NaiveDateTime) -> Self {
        DataValue::DateTime(d)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(items: Vec<DataValue>) -> Self {
        DataValue::List(items)
    }
}
