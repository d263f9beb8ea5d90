//! Unified error types for codefix

use thiserror::Error;

/// Error type for configuration and shared core operations
#[derive(Error, Debug)]
pub enum CodefixError {
    #[error("Config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using CodefixError
pub type Result<T> = std::result::Result<T, CodefixError>;
