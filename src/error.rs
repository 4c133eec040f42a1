//! Error types for the mouthguard tracker.

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

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Filter initialization or processing error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Overlay asset could not be loaded
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// Camera acquisition failed
    #[error("Camera error: {0}")]
    Camera(String),

    /// Replay trace is malformed
    #[error("Trace error: {0}")]
    Trace(String),
}

/// Outcome of a detection that saw no face.
///
/// This is an expected, frequent condition and is deliberately kept out of [`Error`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("no face found")]
pub struct NoFaceFound;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
