use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use crate::tool_locator::ToolNotFound;

/// Errors raised by the compressors.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error(transparent)]
    ToolNotFound(#[from] ToolNotFound),

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} did not finish within {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("Compression failed: {0}")]
    Failed(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CompressionError {
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self, CompressionError::ToolNotFound(_))
    }
}

impl From<image::ImageError> for CompressionError {
    fn from(err: image::ImageError) -> Self {
        CompressionError::Failed(err.to_string())
    }
}
