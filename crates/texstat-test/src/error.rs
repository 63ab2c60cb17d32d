//! Error types for the test helpers

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Synthetic image could not be wrapped in a view
    #[error("core error: {0}")]
    Core(#[from] texstat_core::Error),

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Slice comparison failed on length
    #[error("length mismatch at index {index}: expected {expected}, got {actual}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
