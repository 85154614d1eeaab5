//! Error types for multiplexer CLI calls.
//!
//! Every variant is an external-tool failure. Callers recover from all of
//! them by falling back to the next resolution tier.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors from running the multiplexer CLI.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The executable could not be found
    #[error("{program} not found")]
    NotFound { program: String },

    /// The process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process did not exit in time and was killed
    #[error("{program} timed out after {}ms", timeout.as_millis())]
    Timeout { program: String, timeout: Duration },

    /// The process exited unsuccessfully
    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Output was not the expected JSON
    #[error("malformed CLI output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    /// Temp file or process I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MuxError {
    /// Returns true if the failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for multiplexer operations.
pub type MuxResult<T> = Result<T, MuxError>;
