//! Error types for texstat-core
//!
//! Construction of image views and swizzles is the only fallible surface of
//! this crate. Every variant carries the offending values so callers can
//! report them without re-deriving context.

use thiserror::Error;

/// texstat-core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {x}x{y}x{z}")]
    InvalidDimension { x: usize, y: usize, z: usize },

    /// Pixel buffer length does not match the image dimensions
    #[error("pixel data length mismatch: expected {expected} channels, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for texstat-core operations
pub type Result<T> = std::result::Result<T, Error>;
