use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single document did not convert. Always recovered per document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("conversion engine not found: {0}")]
    EngineNotFound(String),

    #[error("conversion timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("conversion failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    EngineNotFound,
    ConversionTimeout,
    ConversionFailed,
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::EngineNotFound(_) => ErrorKind::EngineNotFound,
            ConversionError::Timeout { .. } => ErrorKind::ConversionTimeout,
            ConversionError::Failed(_) => ErrorKind::ConversionFailed,
        }
    }

    pub fn not_found() -> Self {
        ConversionError::EngineNotFound(
            "LibreOffice not found; verify it is installed and on PATH".to_string(),
        )
    }
}
