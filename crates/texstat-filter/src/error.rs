//! Error types for texstat-filter

use thiserror::Error;

/// Errors that can occur while setting up or running a statistics pass
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] texstat_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Output arrays do not match the image pixel count
    #[error("output size mismatch: expected {expected} pixels, got {actual}")]
    OutputSizeMismatch { expected: usize, actual: usize },

    /// Working buffer could not be allocated
    #[error("work buffer allocation failed ({cells} cells)")]
    AllocationFailed { cells: usize },
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
