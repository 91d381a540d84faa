//! # demtile-lerc
//!
//! Decoder for Lerc2 (Limited Error Raster Compression) blobs carrying 32-bit
//! float elevation rasters, as served by Esri world elevation tile services.
//!
//! ## Overview
//!
//! A blob is one or more concatenated band blobs, each with a header, an
//! optional run-length encoded validity mask and the band values. Versions 3
//! through 6 are decoded, covering one-sweep and tiled bit-stuffed bands.
//! Entropy-coded bands (Huffman or lossless float) are rejected with
//! [`LercError::Decode`].
//!
//! ## Example
//!
//! ```no_run
//! use demtile_lerc::{decode_compressed_raster, Decoded};
//!
//! let blob = std::fs::read("tile.lerc")?;
//! match decode_compressed_raster(&blob)? {
//!     Decoded::Grid(grid) => println!("{}x{} elevations", grid.width(), grid.height()),
//!     Decoded::NoData => println!("tile is entirely masked"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bitstuff;
mod decoder;
mod error;
mod grid;
mod header;
mod info;
mod lerc2;
mod mask;
mod reader;
#[cfg(any(test, feature = "test-util"))]
mod writer;

pub use decoder::{decode_compressed_raster, Decoded};
pub use error::LercError;
pub use grid::{ElevationGrid, RasterShape};
pub use header::{fletcher32, DataType, Lerc2Header, CURRENT_VERSION, FILE_KEY, MIN_DECODE_VERSION};
pub use info::{blob_info, BlobInfo};
#[cfg(any(test, feature = "test-util"))]
pub use writer::BlobWriter;

/// Result type for LERC operations.
pub type Result<T> = std::result::Result<T, LercError>;
