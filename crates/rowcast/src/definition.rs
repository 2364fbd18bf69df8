//! Block and cell definition model
//!
//! Definitions describe the rectangular regions of a sheet and where each
//! cell lands in the output graph. They are supplied by the caller — built
//! programmatically or loaded from JSON — and are read-only during a pass.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::path::{PathError, PropertyPath};
use crate::schema::PropertyKind;

/// One mapped cell inside a block.
///
/// `row` and `col` are absolute coordinates within one block iteration;
/// `data_name` is resolved relative to the block's result object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    /// Row within the block's first iteration
    pub row: u32,
    /// Column
    pub col: u16,
    /// Property path inside the block result
    pub data_name: String,
    /// Declared property kind; overrides any schema declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    /// Date format hint (chrono format string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl CellDefinition {
    /// Create a cell definition with no type or format hints
    pub fn new<S: Into<String>>(row: u32, col: u16, data_name: S) -> Self {
        Self {
            row,
            col,
            data_name: data_name.into(),
            kind: None,
            format: None,
        }
    }

    /// Set the declared property kind (builder style)
    pub fn with_kind(mut self, kind: PropertyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the date format hint (builder style)
    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Loop termination rule: a sentinel cell inspected before each prospective
/// iteration. A blank sentinel always stops; a configured `stop_value` stops
/// when the sentinel's text equals it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakCondition {
    /// Column of the sentinel cell
    pub col: u16,
    /// Row offset of the sentinel within the iteration's row-group
    #[serde(default)]
    pub row_offset: u32,
    /// Stop when the sentinel renders to exactly this text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_value: Option<String>,
}

impl BreakCondition {
    /// Stop when the given column's cell is blank
    pub fn blank(col: u16) -> Self {
        Self {
            col,
            row_offset: 0,
            stop_value: None,
        }
    }

    /// Also stop on a sentinel text value (builder style)
    pub fn with_stop_value<S: Into<String>>(mut self, value: S) -> Self {
        self.stop_value = Some(value.into());
        self
    }

    /// Sentinel row offset within the row-group (builder style)
    pub fn with_row_offset(mut self, row_offset: u32) -> Self {
        self.row_offset = row_offset;
        self
    }
}

/// A declared rectangular region: a one-off "simple" block or a repeating
/// "loop" block whose row span repeats until the break condition fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Whether the block repeats
    pub is_loop: bool,
    /// First row of the block (first iteration for loops)
    pub start_row: u32,
    /// Last row of the block's span
    pub end_row: u32,
    /// Leftmost column of the block
    pub start_col: u16,
    /// Path where the block's result is stored
    pub data_name: String,
    /// Registry name of the target schema; absent means a plain record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
    /// Loop termination rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_condition: Option<BreakCondition>,
    /// Mapped cells, processed in order
    #[serde(default)]
    pub cells: Vec<CellDefinition>,
}

impl BlockDefinition {
    /// Create a simple (non-repeating) block
    pub fn simple<S: Into<String>>(start_row: u32, end_row: u32, start_col: u16, data_name: S) -> Self {
        Self {
            is_loop: false,
            start_row,
            end_row,
            start_col,
            data_name: data_name.into(),
            target_schema: None,
            break_condition: None,
            cells: Vec::new(),
        }
    }

    /// Create a loop block
    pub fn looping<S: Into<String>>(start_row: u32, end_row: u32, start_col: u16, data_name: S) -> Self {
        Self {
            is_loop: true,
            ..Self::simple(start_row, end_row, start_col, data_name)
        }
    }

    /// Name the target schema (builder style)
    pub fn with_target<S: Into<String>>(mut self, schema: S) -> Self {
        self.target_schema = Some(schema.into());
        self
    }

    /// Set the break condition (builder style)
    pub fn with_break(mut self, condition: BreakCondition) -> Self {
        self.break_condition = Some(condition);
        self
    }

    /// Append a mapped cell (builder style)
    pub fn cell<S: Into<String>>(mut self, row: u32, col: u16, data_name: S) -> Self {
        self.cells.push(CellDefinition::new(row, col, data_name));
        self
    }

    /// Append a fully specified cell definition (builder style)
    pub fn cell_def(mut self, cell: CellDefinition) -> Self {
        self.cells.push(cell);
        self
    }

    /// Fixed row-height of one iteration
    pub fn step(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row) + 1
    }
}

/// Ordered list of block definitions for one sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDefinition {
    /// Blocks, processed in order
    pub blocks: Vec<BlockDefinition>,
}

impl SheetDefinition {
    /// Create a definition from its blocks
    pub fn new(blocks: Vec<BlockDefinition>) -> Self {
        Self { blocks }
    }

    /// Parse a definition from JSON, logging validation warnings
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let definition: SheetDefinition = serde_json::from_str(json)?;
        for warning in definition.validate()? {
            warn!("sheet definition: {warning}");
        }
        Ok(definition)
    }

    /// Load a definition from a JSON file, logging validation warnings
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DefinitionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the definition for fatal inconsistencies and surprising but
    /// tolerated shapes.
    ///
    /// Errors abort loading; warnings describe blocks the read pass will
    /// quietly ignore or clamp (a second loop block, a loop with no break
    /// condition, cells outside their block's rectangle).
    pub fn validate(&self) -> Result<Vec<DefinitionWarning>, DefinitionError> {
        let mut warnings = Vec::new();
        let mut loops_seen = 0usize;

        for (index, block) in self.blocks.iter().enumerate() {
            if block.end_row < block.start_row {
                return Err(DefinitionError::InvalidRowSpan {
                    block: index,
                    start_row: block.start_row,
                    end_row: block.end_row,
                });
            }
            if block.data_name.is_empty() {
                return Err(DefinitionError::MissingDataName { block: index });
            }
            PropertyPath::parse(&block.data_name).map_err(|source| {
                DefinitionError::InvalidPath {
                    block: index,
                    data_name: block.data_name.clone(),
                    source,
                }
            })?;
            if block.is_loop && block.cells.is_empty() {
                return Err(DefinitionError::EmptyLoopBlock { block: index });
            }

            for cell in &block.cells {
                PropertyPath::parse(&cell.data_name).map_err(|source| {
                    DefinitionError::InvalidPath {
                        block: index,
                        data_name: cell.data_name.clone(),
                        source,
                    }
                })?;
                let inside = cell.row >= block.start_row
                    && cell.row <= block.end_row
                    && cell.col >= block.start_col;
                if !inside {
                    warnings.push(DefinitionWarning::CellOutsideBlock {
                        block: index,
                        row: cell.row,
                        col: cell.col,
                    });
                }
            }

            if block.is_loop {
                loops_seen += 1;
                if loops_seen > 1 {
                    warnings.push(DefinitionWarning::ExtraLoopBlock { block: index });
                }
                if block.break_condition.is_none() {
                    warnings.push(DefinitionWarning::NoBreakCondition { block: index });
                }
            }
        }

        Ok(warnings)
    }
}

/// Fatal definition inconsistencies detected at the load boundary
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Block rows are inverted
    #[error("block {block}: end_row {end_row} precedes start_row {start_row}")]
    InvalidRowSpan {
        /// Block index
        block: usize,
        /// Declared start row
        start_row: u32,
        /// Declared end row
        end_row: u32,
    },

    /// Block has no data name
    #[error("block {block}: data_name is required")]
    MissingDataName {
        /// Block index
        block: usize,
    },

    /// Loop block maps no cells
    #[error("block {block}: loop block defines no cells")]
    EmptyLoopBlock {
        /// Block index
        block: usize,
    },

    /// A data name fails to parse as a property path
    #[error("block {block}: bad path '{data_name}': {source}")]
    InvalidPath {
        /// Block index
        block: usize,
        /// Offending path text
        data_name: String,
        /// Parse failure
        source: PathError,
    },

    /// Definition JSON is malformed
    #[error("definition JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Definition file is unreadable
    #[error("definition file: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal definition findings surfaced at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionWarning {
    /// Loop blocks past the first are skipped by default
    ExtraLoopBlock {
        /// Block index
        block: usize,
    },
    /// Loop block runs to the iteration ceiling
    NoBreakCondition {
        /// Block index
        block: usize,
    },
    /// Cell coordinates fall outside the block rectangle
    CellOutsideBlock {
        /// Block index
        block: usize,
        /// Cell row
        row: u32,
        /// Cell column
        col: u16,
    },
}

impl fmt::Display for DefinitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionWarning::ExtraLoopBlock { block } => write!(
                f,
                "block {block} is a second loop block; it will be skipped unless all_loop_blocks is set"
            ),
            DefinitionWarning::NoBreakCondition { block } => write!(
                f,
                "loop block {block} has no break condition; it will run to the iteration ceiling"
            ),
            DefinitionWarning::CellOutsideBlock { block, row, col } => write!(
                f,
                "block {block}: cell ({row}, {col}) lies outside the block's rectangle"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items_block() -> BlockDefinition {
        BlockDefinition::looping(1, 1, 0, "items")
            .with_break(BreakCondition::blank(0))
            .cell(1, 0, "id")
    }

    #[test]
    fn test_step() {
        assert_eq!(items_block().step(), 1);
        assert_eq!(BlockDefinition::looping(2, 4, 0, "x").step(), 3);
    }

    #[test]
    fn test_validate_clean() {
        let definition = SheetDefinition::new(vec![
            BlockDefinition::simple(0, 0, 0, "header").cell(0, 0, "title"),
            items_block(),
        ]);
        assert_eq!(definition.validate().unwrap(), vec![]);
    }

    #[test]
    fn test_validate_errors() {
        let inverted = SheetDefinition::new(vec![BlockDefinition::simple(3, 1, 0, "x")]);
        assert!(matches!(
            inverted.validate(),
            Err(DefinitionError::InvalidRowSpan { .. })
        ));

        let unnamed = SheetDefinition::new(vec![BlockDefinition::simple(0, 0, 0, "")]);
        assert!(matches!(
            unnamed.validate(),
            Err(DefinitionError::MissingDataName { .. })
        ));

        let no_cells = SheetDefinition::new(vec![BlockDefinition::looping(0, 0, 0, "items")]);
        assert!(matches!(
            no_cells.validate(),
            Err(DefinitionError::EmptyLoopBlock { .. })
        ));

        let bad_path =
            SheetDefinition::new(vec![BlockDefinition::simple(0, 0, 0, "a..b").cell(0, 0, "x")]);
        assert!(matches!(
            bad_path.validate(),
            Err(DefinitionError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_validate_warnings() {
        let definition = SheetDefinition::new(vec![
            items_block(),
            BlockDefinition::looping(5, 5, 0, "extras").cell(5, 0, "id"),
            BlockDefinition::simple(0, 0, 2, "header").cell(9, 0, "title"),
        ]);

        let warnings = definition.validate().unwrap();
        assert_eq!(
            warnings,
            vec![
                DefinitionWarning::ExtraLoopBlock { block: 1 },
                DefinitionWarning::NoBreakCondition { block: 1 },
                DefinitionWarning::CellOutsideBlock {
                    block: 2,
                    row: 9,
                    col: 0
                },
            ]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let definition = SheetDefinition::new(vec![items_block()
            .with_target("Item")
            .cell_def(CellDefinition::new(1, 1, "when").with_kind(PropertyKind::Date))]);

        let json = serde_json::to_string(&definition).unwrap();
        let parsed = SheetDefinition::from_json_str(&json).unwrap();
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "blocks": [{
                "is_loop": true,
                "start_row": 1, "end_row": 1, "start_col": 0,
                "data_name": "items",
                "break_condition": { "col": 0 },
                "cells": [{ "row": 1, "col": 0, "data_name": "id" }]
            }]
        }"#;
        let definition = SheetDefinition::from_json_str(json).unwrap();
        let block = &definition.blocks[0];
        assert!(block.is_loop);
        assert_eq!(block.break_condition.as_ref().unwrap().row_offset, 0);
        assert_eq!(block.cells[0].kind, None);
    }
}
