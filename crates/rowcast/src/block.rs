//! Block reading
//!
//! Materializes one block definition against the current output graph:
//! simple blocks bind a single result object, loop blocks append one item
//! per row-group until the break condition fires. Per-cell failures are
//! recorded and never abort an otherwise-good block.

use rowcast_core::{CellAddress, ValueSource};
use tracing::{debug, warn};

use crate::convert::convert;
use crate::data::DataValue;
use crate::definition::{BlockDefinition, BreakCondition, CellDefinition};
use crate::extract::extract;
use crate::path::{get_path, get_path_mut, set_path, PropertyPath};
use crate::reader::ReadOptions;
use crate::schema::{RecordSchema, SchemaRegistry};
use crate::status::{ReadError, ReadStatus};

/// Reads individual blocks for one sheet pass
pub(crate) struct BlockReader<'a, S: ValueSource + ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) registry: Option<&'a SchemaRegistry>,
    pub(crate) options: &'a ReadOptions,
    pub(crate) sheet: usize,
}

impl<'a, S: ValueSource + ?Sized> BlockReader<'a, S> {
    /// Read a simple block: fixed cells at absolute coordinates, bound as
    /// one result object at the block's data name.
    pub(crate) fn read_simple_block(
        &self,
        root: &mut DataValue,
        block: &BlockDefinition,
        status: &mut ReadStatus,
    ) {
        let Some(path) = self.block_path(block, status) else {
            return;
        };
        let Ok(schema) = self.resolve_schema(block, status) else {
            return;
        };

        let mut result = match schema {
            Some(schema) => schema.instantiate(),
            None => DataValue::record(),
        };
        for cell in &block.cells {
            self.process_cell(&mut result, cell, cell.row, schema, status);
        }

        if let Err(reason) = set_path(root, &path, result) {
            status.record(ReadError::Setting {
                sheet: self.sheet,
                data_name: block.data_name.clone(),
                message: format!("cannot bind block result: {reason}"),
            });
        }
    }

    /// Read a loop block: append one item per row-group to the collection
    /// at the block's data name, creating it when absent and reusing it
    /// across invocations.
    pub(crate) fn read_loop_block(
        &self,
        root: &mut DataValue,
        block: &BlockDefinition,
        status: &mut ReadStatus,
    ) {
        let Some(path) = self.block_path(block, status) else {
            return;
        };
        let Ok(schema) = self.resolve_schema(block, status) else {
            return;
        };

        match get_path(root, &path) {
            None | Some(DataValue::Null) => {
                if let Err(reason) = set_path(root, &path, DataValue::list()) {
                    status.record(ReadError::Setting {
                        sheet: self.sheet,
                        data_name: block.data_name.clone(),
                        message: format!("cannot create loop collection: {reason}"),
                    });
                    return;
                }
            }
            Some(DataValue::List(_)) => {}
            Some(other) => {
                status.record(ReadError::Setting {
                    sheet: self.sheet,
                    data_name: block.data_name.clone(),
                    message: format!(
                        "existing value at '{}' is a {}, not a list",
                        block.data_name,
                        other.type_name()
                    ),
                });
                return;
            }
        }
        let Some(DataValue::List(items)) = get_path_mut(root, &path) else {
            status.record(ReadError::System {
                sheet: self.sheet,
                data_name: block.data_name.clone(),
                message: "loop collection vanished after binding".into(),
            });
            return;
        };

        let step = block.step();
        let mut origin = block.start_row;
        let mut iterations = 0u32;
        loop {
            if let Some(condition) = &block.break_condition {
                if self.should_break(condition, origin) {
                    break;
                }
            }
            if iterations >= self.options.max_loop_iterations {
                warn!(
                    sheet = self.sheet,
                    data_name = %block.data_name,
                    limit = self.options.max_loop_iterations,
                    "loop block hit the iteration ceiling"
                );
                status.record(ReadError::LoopCeiling {
                    sheet: self.sheet,
                    data_name: block.data_name.clone(),
                    limit: self.options.max_loop_iterations,
                });
                break;
            }

            let item = self.read_iteration(block, schema, origin, status);
            items.push(item);
            origin = origin.saturating_add(step);
            iterations += 1;
        }
        debug!(
            sheet = self.sheet,
            data_name = %block.data_name,
            iterations,
            "loop block finished"
        );
    }

    /// Materialize one loop iteration rooted at `origin`. The item is
    /// returned even when some of its cells failed.
    fn read_iteration(
        &self,
        block: &BlockDefinition,
        schema: Option<&RecordSchema>,
        origin: u32,
        status: &mut ReadStatus,
    ) -> DataValue {
        let mut item = match schema {
            Some(schema) => schema.instantiate(),
            None => DataValue::record(),
        };
        for cell in &block.cells {
            let abs_row = origin.saturating_add(cell.row.saturating_sub(block.start_row));
            self.process_cell(&mut item, cell, abs_row, schema, status);
        }
        item
    }

    /// Extract, convert, and assign one cell into `target`. Failures are
    /// recorded and leave the rest of the block untouched.
    fn process_cell(
        &self,
        target: &mut DataValue,
        cell: &CellDefinition,
        abs_row: u32,
        schema: Option<&RecordSchema>,
        status: &mut ReadStatus,
    ) {
        let address = CellAddress::new(abs_row, cell.col);
        let path = match PropertyPath::parse(&cell.data_name) {
            Ok(path) => path,
            Err(reason) => {
                status.record(ReadError::Assignment {
                    sheet: self.sheet,
                    address,
                    path: cell.data_name.clone(),
                    reason,
                });
                return;
            }
        };

        let scalar = extract(self.source, self.sheet, abs_row, cell.col);
        let kind = cell
            .kind
            .or_else(|| schema.and_then(|s| s.kind_of(&cell.data_name)))
            .unwrap_or_default();

        let value = match convert(scalar, kind, cell.format.as_deref(), self.sheet, address) {
            Ok(value) => value,
            Err(error) => {
                status.record(ReadError::Conversion(error));
                return;
            }
        };
        if let Err(reason) = set_path(target, &path, value) {
            status.record(ReadError::Assignment {
                sheet: self.sheet,
                address,
                path: cell.data_name.clone(),
                reason,
            });
        }
    }

    /// Inspect the sentinel cell of the next prospective row-group.
    fn should_break(&self, condition: &BreakCondition, origin: u32) -> bool {
        let row = origin.saturating_add(condition.row_offset);
        match extract(self.source, self.sheet, row, condition.col) {
            None => true,
            Some(scalar) => {
                if scalar.is_blank_text() {
                    return true;
                }
                match &condition.stop_value {
                    Some(stop) => scalar.display_text().trim() == stop,
                    None => false,
                }
            }
        }
    }

    /// Parse the block's data name, recording a setting error when it is
    /// missing or malformed.
    fn block_path(
        &self,
        block: &BlockDefinition,
        status: &mut ReadStatus,
    ) -> Option<PropertyPath> {
        if block.data_name.is_empty() {
            status.record(ReadError::Setting {
                sheet: self.sheet,
                data_name: String::new(),
                message: "data_name is required".into(),
            });
            return None;
        }
        match PropertyPath::parse(&block.data_name) {
            Ok(path) => Some(path),
            Err(reason) => {
                status.record(ReadError::Setting {
                    sheet: self.sheet,
                    data_name: block.data_name.clone(),
                    message: format!("bad data_name: {reason}"),
                });
                None
            }
        }
    }

    /// Resolve the block's target schema once, before any cell work.
    fn resolve_schema(
        &self,
        block: &BlockDefinition,
        status: &mut ReadStatus,
    ) -> Result<Option<&'a RecordSchema>, ()> {
        let Some(name) = &block.target_schema else {
            return Ok(None);
        };
        match self.registry.and_then(|registry| registry.get(name)) {
            Some(schema) => Ok(Some(schema)),
            None => {
                status.record(ReadError::System {
                    sheet: self.sheet,
                    data_name: block.data_name.clone(),
                    message: format!("target schema '{name}' is not registered"),
                });
                Err(())
            }
        }
    }
}
