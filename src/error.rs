//! Error types for the gaze point estimation library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Device display profile has non-positive or non-finite dimensions
    #[error("Invalid display profile: {0}")]
    InvalidProfile(String),

    /// Tracking session could not be started or replayed
    #[error("Tracking error: {0}")]
    TrackingError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
