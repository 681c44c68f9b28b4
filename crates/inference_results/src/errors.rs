//! Error types for inference result encoding and projection

use thiserror::Error;

/// Errors that can occur while building, encoding or projecting results
#[derive(Error, Debug)]
pub enum ResultsError {
    /// A required argument was missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value that must be present was null
    #[error("[{0}] must not be null")]
    NullField(String),

    /// The byte stream is truncated or carries an unknown tag
    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    /// Configuration is invalid or could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for inference result operations
pub type Result<T> = std::result::Result<T, ResultsError>;
