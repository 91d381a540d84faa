//! Error types for the Lerc2 decoder.

use crate::DataType;
use thiserror::Error;

/// Errors that can occur when reading or decoding a Lerc2 blob.
#[derive(Debug, Error)]
pub enum LercError {
    /// The blob is empty, truncated, or its metadata could not be parsed.
    #[error("Invalid LERC blob: {0}")]
    Format(String),

    /// The blob declares a non-positive raster shape.
    #[error("Invalid LERC dimensions: {cols}x{rows}x{bands}")]
    Shape {
        /// Number of columns.
        cols: i32,
        /// Number of rows.
        rows: i32,
        /// Number of bands.
        bands: i32,
    },

    /// The blob stores a sample type other than 32-bit float.
    #[error("Unsupported LERC data type: {0} (expected {})", DataType::Float)]
    UnsupportedType(DataType),

    /// The decompressor rejected the blob body.
    #[error("LERC decode failed: {0}")]
    Decode(String),

    /// The output grid could not be allocated.
    #[error("Memory allocation failed: {bytes} bytes")]
    Allocation {
        /// Requested size in bytes.
        bytes: usize,
    },
}

impl LercError {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        LercError::Format(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        LercError::Decode(message.into())
    }
}
