//! Error types for the tile pipeline.

use demtile_lerc::LercError;
use thiserror::Error;

/// Errors that can occur while converting or resampling elevation tiles.
#[derive(Debug, Error)]
pub enum TileError {
    /// A caller-supplied parameter is out of range or unknown.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// The raster container could not be parsed or written.
    #[error("Raster container error: {0}")]
    Container(String),

    /// A raster buffer could not be allocated.
    #[error("Memory allocation failed: {bytes} bytes")]
    Allocation {
        /// Requested size in bytes.
        bytes: usize,
    },

    /// The compressed elevation blob could not be decoded.
    #[error(transparent)]
    Lerc(#[from] LercError),
}

impl TileError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        TileError::Validation(message.into())
    }

    pub(crate) fn container(message: impl Into<String>) -> Self {
        TileError::Container(message.into())
    }
}
