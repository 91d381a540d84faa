//! Error types for the command line tool.

use demtile::{LercError, TileError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a command, tagged with the input they concern.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input or writing an output failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Converting a tile failed.
    #[error("{}: {source}", path.display())]
    Tile {
        /// Input tile.
        path: PathBuf,
        /// Underlying tile error.
        source: TileError,
    },

    /// Serializing a report failed.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn tile(path: impl Into<PathBuf>, source: impl Into<TileError>) -> Self {
        CliError::Tile {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 1    | report serialization                      |
    /// | 2    | invalid parameter                         |
    /// | 3    | malformed, mis-shaped or undecodable blob |
    /// | 4    | PNG container                             |
    /// | 5    | I/O                                       |
    /// | 6    | allocation                                |
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Io { .. } => 5,
            CliError::Json(_) => 1,
            CliError::Tile { source, .. } => match source {
                TileError::Validation(_) => 2,
                TileError::Container(_) => 4,
                TileError::Allocation { .. } => 6,
                TileError::Lerc(LercError::Allocation { .. }) => 6,
                TileError::Lerc(_) => 3,
            },
        }
    }
}
