//! Read status accumulation
//!
//! Every block and cell operation reports failures as tagged [`ReadError`]s
//! merged into one [`ReadStatus`] per sheet read. The status code only ever
//! escalates; once a fatal code is reached it is never replaced.

use std::fmt;

use rowcast_core::CellAddress;
use thiserror::Error;

use crate::convert::ConvertError;
use crate::path::PathError;

/// Aggregate outcome code of a sheet read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// No errors recorded
    Success,
    /// One or more recoverable per-cell failures
    DataCollectionError,
    /// The definition graph is inconsistent with the data; fatal
    SettingError,
    /// Unexpected failure (schema resolution, internal navigation); fatal
    SystemError,
}

impl StatusCode {
    /// Whether this code halts further block processing
    pub fn is_fatal(&self) -> bool {
        matches!(self, StatusCode::SettingError | StatusCode::SystemError)
    }

    fn rank(&self) -> u8 {
        match self {
            StatusCode::Success => 0,
            StatusCode::DataCollectionError => 1,
            StatusCode::SettingError => 2,
            StatusCode::SystemError => 3,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Success => "success",
            StatusCode::DataCollectionError => "data collection error",
            StatusCode::SettingError => "setting error",
            StatusCode::SystemError => "system error",
        };
        write!(f, "{}", name)
    }
}

/// One captured failure from a block or cell operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    /// A cell's value failed to coerce to its declared kind
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// A converted value failed to land at its property path
    #[error("sheet {sheet} cell {address}: assignment to '{path}' failed: {reason}")]
    Assignment {
        /// Sheet index
        sheet: usize,
        /// Cell the value came from
        address: CellAddress,
        /// Property path text
        path: String,
        /// Path syntax or navigation failure
        reason: PathError,
    },

    /// The definition is inconsistent with the data it met
    #[error("sheet {sheet} block '{data_name}': {message}")]
    Setting {
        /// Sheet index
        sheet: usize,
        /// Block data name
        data_name: String,
        /// Description
        message: String,
    },

    /// Unexpected failure; the output graph should not be trusted
    #[error("sheet {sheet} block '{data_name}': {message}")]
    System {
        /// Sheet index
        sheet: usize,
        /// Block data name
        data_name: String,
        /// Description
        message: String,
    },

    /// A loop block ran into the configured iteration ceiling
    #[error("sheet {sheet} loop block '{data_name}' hit the iteration ceiling of {limit}")]
    LoopCeiling {
        /// Sheet index
        sheet: usize,
        /// Block data name
        data_name: String,
        /// Configured ceiling
        limit: u32,
    },
}

impl ReadError {
    /// Status code this error escalates the read to
    pub fn code(&self) -> StatusCode {
        match self {
            ReadError::Conversion(_) | ReadError::Assignment { .. } | ReadError::LoopCeiling { .. } => {
                StatusCode::DataCollectionError
            }
            ReadError::Setting { .. } => StatusCode::SettingError,
            ReadError::System { .. } => StatusCode::SystemError,
        }
    }
}

/// Accumulated outcome of one sheet read
#[derive(Debug)]
pub struct ReadStatus {
    code: StatusCode,
    errors: Vec<ReadError>,
}

impl Default for ReadStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStatus {
    /// Create a fresh status
    pub fn new() -> Self {
        Self {
            code: StatusCode::Success,
            errors: Vec::new(),
        }
    }

    /// Current status code
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// Captured errors, in the order they occurred
    pub fn errors(&self) -> &[ReadError] {
        &self.errors
    }

    /// Whether nothing went wrong
    pub fn is_success(&self) -> bool {
        self.code() == StatusCode::Success
    }

    /// Whether further block processing should halt
    pub fn is_fatal(&self) -> bool {
        self.code().is_fatal()
    }

    /// Capture an error and escalate the status code.
    ///
    /// Escalation is monotonic: a recoverable error never lowers a fatal
    /// code, and the first fatal code sticks.
    pub fn record(&mut self, error: ReadError) {
        let code = error.code();
        if !self.code.is_fatal() && code.rank() > self.code.rank() {
            self.code = code;
        }
        self.errors.push(error);
    }
}
