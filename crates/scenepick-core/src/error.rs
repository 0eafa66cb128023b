//! Error types for scenepick-rs.

use thiserror::Error;

/// The main error type for scenepick-rs operations.
///
/// Nothing in the per-frame picking path returns this: clicks that cannot be
/// honoured become no-ops. Errors only surface while constructing resources
/// or loading configuration.
#[derive(Error, Debug)]
pub enum PickError {
    /// Options failed validation.
    #[error("invalid pick options: {0}")]
    InvalidOptions(String),

    /// The backend refused to create a resource.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for scenepick-rs operations.
pub type Result<T> = std::result::Result<T, PickError>;
