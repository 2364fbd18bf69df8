//! Sheet reading
//!
//! Drives one sheet's ordered block definitions, gating each block on the
//! accumulated status and the one-loop-per-sheet policy, and merging every
//! block's outcome into a single [`ReadStatus`].

use rowcast_core::ValueSource;
use tracing::debug;

use crate::block::BlockReader;
use crate::data::DataValue;
use crate::definition::SheetDefinition;
use crate::schema::SchemaRegistry;
use crate::status::{ReadStatus, StatusCode};

/// Options governing a sheet read
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Keep processing blocks after recoverable cell errors
    pub skip_errors: bool,
    /// Upper bound on iterations of any one loop block
    pub max_loop_iterations: u32,
    /// Process every loop block instead of only the first
    pub all_loop_blocks: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_errors: true,
            max_loop_iterations: 10_000,
            all_loop_blocks: false,
        }
    }
}

/// Outcome of one sheet read: the output graph and its status
#[derive(Debug)]
pub struct SheetResult {
    /// Output object graph, owned by the caller
    pub data: DataValue,
    /// Accumulated read status; inspect before trusting `data`
    pub status: ReadStatus,
}

/// Reads sheets of a value source against sheet definitions
pub struct SheetReader<'a, S: ValueSource + ?Sized> {
    source: &'a S,
    registry: Option<&'a SchemaRegistry>,
    options: ReadOptions,
}

impl<'a, S: ValueSource + ?Sized> SheetReader<'a, S> {
    /// Create a reader with default options and no schemas
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            registry: None,
            options: ReadOptions::default(),
        }
    }

    /// Attach a schema registry for blocks naming target schemas (builder style)
    pub fn with_schemas(mut self, registry: &'a SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Override the read options (builder style)
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Read one sheet into a fresh output graph
    pub fn read(&self, sheet: usize, definition: &SheetDefinition) -> SheetResult {
        let mut data = DataValue::record();
        let mut status = ReadStatus::new();
        self.read_into(sheet, definition, &mut data, &mut status);
        SheetResult { data, status }
    }

    /// Read one sheet into an existing graph and status, accumulating with
    /// whatever previous reads put there.
    pub fn read_into(
        &self,
        sheet: usize,
        definition: &SheetDefinition,
        root: &mut DataValue,
        status: &mut ReadStatus,
    ) {
        let block_reader = BlockReader {
            source: self.source,
            registry: self.registry,
            options: &self.options,
            sheet,
        };

        let mut loops_processed = 0usize;
        for (index, block) in definition.blocks.iter().enumerate() {
            let proceed = match status.code() {
                StatusCode::Success => true,
                StatusCode::DataCollectionError => self.options.skip_errors,
                StatusCode::SettingError | StatusCode::SystemError => false,
            };
            if !proceed {
                continue;
            }

            if block.is_loop {
                if loops_processed > 0 && !self.options.all_loop_blocks {
                    debug!(sheet, index, data_name = %block.data_name, "skipping extra loop block");
                    continue;
                }
                block_reader.read_loop_block(root, block, status);
                loops_processed += 1;
            } else {
                block_reader.read_simple_block(root, block, status);
            }
        }
    }
}
