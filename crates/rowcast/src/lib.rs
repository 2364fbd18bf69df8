//! # rowcast
//!
//! Declarative mapping of templated spreadsheet regions onto nested data
//! graphs.
//!
//! A [`SheetDefinition`] describes rectangular regions of a sheet — fixed
//! "simple" blocks and repeating "loop" blocks — and where each cell lands
//! in the output. A [`SheetReader`] drives those definitions against any
//! [`ValueSource`], coercing cells to their declared kinds and collecting
//! per-cell failures into a [`ReadStatus`] instead of aborting the read.
//!
//! ## Example
//!
//! ```rust
//! use rowcast::prelude::*;
//! use rowcast_core::Workbook;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.sheet_mut(0).unwrap();
//! sheet.set_value_at(0, 0, "A").unwrap();
//! sheet.set_value_at(1, 0, "B").unwrap();
//!
//! let definition = SheetDefinition::new(vec![BlockDefinition::looping(0, 0, 0, "items")
//!     .with_break(BreakCondition::blank(0))
//!     .cell(0, 0, "id")]);
//!
//! let result = SheetReader::new(&workbook).read(0, &definition);
//! assert!(result.status.is_success());
//! assert_eq!(result.data.get("items").unwrap().as_list().unwrap().len(), 2);
//! ```

pub mod block;
pub mod convert;
pub mod data;
pub mod definition;
pub mod extract;
pub mod path;
pub mod prelude;
pub mod reader;
pub mod schema;
pub mod status;

// Re-exports for convenience
pub use convert::{ConvertError, DEFAULT_DATE_FORMAT};
pub use data::DataValue;
pub use definition::{
    BlockDefinition, BreakCondition, CellDefinition, DefinitionError, DefinitionWarning,
    SheetDefinition,
};
pub use extract::{extract, CellScalar};
pub use path::{get_path, set_path, PathError, PropertyPath, Segment};
pub use reader::{ReadOptions, SheetReader, SheetResult};
pub use schema::{PropertyKind, RecordSchema, SchemaRegistry};
pub use status::{ReadError, ReadStatus, StatusCode};

// Re-export the value-extraction contract so callers rarely need to depend
// on rowcast-core directly
pub use rowcast_core::{EvaluatedCell, ValueSource};
