//! Error types for the engine

use thiserror::Error;

use crate::strategy::GridError;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for tick processing
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tick could not be decoded or lacks a required field
    #[error("Malformed tick: {0}")]
    MalformedTick(String),

    /// Grid computation rejected its arguments
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// State store read or write failed
    #[error("Store error: {0}")]
    Store(String),

    /// Trade sink could not accept an instruction
    #[error("Trade sink error: {0}")]
    Sink(String),

    /// Bridge socket errors
    #[error("Bridge I/O error: {0}")]
    BridgeIo(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Input errors are dropped by the ingress loop; everything else is an
    /// I/O or configuration failure the caller has to act on.
    pub fn is_discardable(&self) -> bool {
        matches!(self, EngineError::MalformedTick(_) | EngineError::JsonParse(_))
    }
}
