//! # demtile
//!
//! Elevation tile conversions: LERC blobs to Terrain-RGB PNGs, and
//! downsampling of Terrain-RGB or Terrarium PNG tiles.
//!
//! ## Overview
//!
//! ### Pixel encodings
//!
//! Elevations in meters are packed into 8-bit RGB pixels with one of two
//! schemes, see [`EncodingScheme`]:
//! - Mapbox Terrain-RGB: 0.1 m resolution from -10000 m
//! - Terrarium: 1/256 m resolution, offset by 32768 m
//!
//! ### Pipeline
//!
//! - [`elevation_to_terrain_container`] decodes a LERC blob and writes the
//!   first band as a Terrain-RGB PNG, dropping the overlap border of 257
//!   pixel tiles.
//! - [`downsample_raster`] shrinks an encoded PNG tile, decoding and
//!   re-encoding elevations for the average and maximum methods.
//!
//! ## Examples
//!
//! ```no_run
//! use demtile::{downsample_raster, elevation_to_terrain_container};
//!
//! let blob = std::fs::read("tile.lerc")?;
//! if let Some(png) = elevation_to_terrain_container(&blob)? {
//!     let half = downsample_raster(&png, 128, "mapbox", "average")?;
//!     std::fs::write("tile-128.png", half)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod container;
mod downsample;
mod error;
mod pipeline;
mod raster;

pub use codec::{decode_terrain_pixel, encode_terrain_pixel, EncodingScheme};
pub use container::{decode_png, encode_png};
pub use downsample::{downsample, validate_target_size, DownsampleMethod, MAX_TARGET_SIZE};
pub use error::TileError;
pub use pipeline::{
    crop_tile_border, decode_terrain_container, downsample_raster, elevation_to_terrain_container,
    encode_elevation_grid, BORDERED_TILE_SIZE,
};
pub use raster::RgbRaster;

pub use demtile_lerc::{
    blob_info, decode_compressed_raster, BlobInfo, DataType, Decoded, ElevationGrid, LercError,
    RasterShape,
};

/// Result type for tile operations.
pub type Result<T> = std::result::Result<T, TileError>;
