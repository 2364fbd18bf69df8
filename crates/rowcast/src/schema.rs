//! Declared target types and the schema registry
//!
//! A [`RecordSchema`] stands in for a target class: it names the record
//! shape a block materializes and declares the property kind behind each
//! field path. Schemas are looked up once per block, not per cell.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::DataValue;
use crate::path::{set_path, PropertyPath};

/// Declared property types driving cell conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// No declared type; the extracted value keeps its natural shape
    Any,
    /// Boolean property
    Bool,
    /// Integer property
    Int,
    /// Floating point property
    Float,
    /// Text property
    Text,
    /// Date-time property
    Date,
}

impl PropertyKind {
    /// Get the kind name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Any => "any",
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
            PropertyKind::Text => "text",
            PropertyKind::Date => "date",
        }
    }
}

impl Default for PropertyKind {
    fn default() -> Self {
        PropertyKind::Any
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named record shape: field paths mapped to their declared kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Registry name of the schema
    pub name: String,
    /// Field path (dotted/indexed form) to declared kind
    #[serde(default)]
    pub fields: BTreeMap<String, PropertyKind>,
}

impl RecordSchema {
    /// Create a schema with no declared fields
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Declare a field (builder style)
    pub fn field<S: Into<String>>(mut self, path: S, kind: PropertyKind) -> Self {
        self.fields.insert(path.into(), kind);
        self
    }

    /// Declared kind of a field path, if any
    pub fn kind_of(&self, path: &str) -> Option<PropertyKind> {
        self.fields.get(path).copied()
    }

    /// Build a fresh instance: a record with every declared field present
    /// and set to null.
    pub fn instantiate(&self) -> DataValue {
        let mut instance = DataValue::record();
        for field in self.fields.keys() {
            match PropertyPath::parse(field) {
                Ok(path) => {
                    if let Err(e) = set_path(&mut instance, &path, DataValue::Null) {
                        warn!(schema = %self.name, field = %field, "unusable schema field: {e}");
                    }
                }
                Err(e) => warn!(schema = %self.name, field = %field, "bad schema field path: {e}"),
            }
        }
        instance
    }
}

/// Name-keyed collection of record schemas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    schemas: BTreeMap<String, RecordSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its own name, replacing any previous entry
    pub fn register(&mut self, schema: RecordSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Look up a schema by name
    pub fn get(&self, name: &str) -> Option<&RecordSchema> {
        self.schemas.get(name)
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
