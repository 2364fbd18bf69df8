//! Convenience re-exports for typical use
//!
//! ```rust
//! use rowcast::prelude::*;
//! ```

pub use crate::convert::ConvertError;
pub use crate::data::DataValue;
pub use crate::definition::{
    BlockDefinition, BreakCondition, CellDefinition, SheetDefinition,
};
pub use crate::reader::{ReadOptions, SheetReader, SheetResult};
pub use crate::schema::{PropertyKind, RecordSchema, SchemaRegistry};
pub use crate::status::{ReadError, ReadStatus, StatusCode};
pub use rowcast_core::{EvaluatedCell, ValueSource};
