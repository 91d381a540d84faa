//! End-to-end tile conversions.

use crate::container::{decode_png, encode_png};
use crate::downsample::{downsample, fits, validate_target_size};
use crate::{DownsampleMethod, EncodingScheme, Result, RgbRaster, TileError};
use demtile_lerc::{decode_compressed_raster, Decoded, ElevationGrid, RasterShape};
use tracing::debug;

/// Edge length of tiles that carry a one pixel overlap border.
pub const BORDERED_TILE_SIZE: u32 = 257;

/// Convert a LERC elevation blob into a Mapbox Terrain-RGB PNG.
///
/// Returns `Ok(None)` when the blob has no valid pixels. Only the first band
/// is encoded, and 257 pixel tiles lose their last column and/or row.
pub fn elevation_to_terrain_container(blob: &[u8]) -> Result<Option<Vec<u8>>> {
    let grid = match decode_compressed_raster(blob)? {
        Decoded::Grid(grid) => grid,
        Decoded::NoData => {
            debug!("elevation blob has no valid pixels, skipping");
            return Ok(None);
        }
    };

    let shape = crop_tile_border(&grid);
    debug!(
        width = grid.width(),
        height = grid.height(),
        bands = grid.bands(),
        out_width = shape.width,
        out_height = shape.height,
        "encoding elevation grid as Terrain-RGB"
    );

    let raster = encode_band(&grid, shape, EncodingScheme::MapboxTerrainRgb)?;
    encode_png(&raster).map(Some)
}

/// Output shape for `grid` after dropping the overlap border.
///
/// Each dimension equal to [`BORDERED_TILE_SIZE`] loses its last pixel; any
/// other size is kept.
pub fn crop_tile_border(grid: &ElevationGrid) -> RasterShape {
    let crop = |n: u32| if n == BORDERED_TILE_SIZE { n - 1 } else { n };
    RasterShape::new(crop(grid.width()), crop(grid.height()))
}

/// Encode the first band of `grid` without cropping.
pub fn encode_elevation_grid(grid: &ElevationGrid, scheme: EncodingScheme) -> Result<RgbRaster> {
    encode_band(grid, grid.shape(), scheme)
}

/// Encode the top-left `shape` window of band 0.
fn encode_band(grid: &ElevationGrid, shape: RasterShape, scheme: EncodingScheme) -> Result<RgbRaster> {
    let band = grid
        .band(0)
        .ok_or_else(|| TileError::validation("elevation grid has no bands"))?;
    let stride = grid.width() as usize;

    let mut raster = RgbRaster::zeroed(shape.width, shape.height)?;
    for y in 0..shape.height {
        let row = &band[y as usize * stride..][..shape.width as usize];
        for (x, &elevation) in row.iter().enumerate() {
            raster.set_pixel(x as u32, y, scheme.encode(elevation));
        }
    }
    Ok(raster)
}

/// Downsample an encoded PNG tile to `target_size x target_size`.
///
/// `scheme` is `"mapbox"` or `"terrarium"`; `method` is `"average"`,
/// `"nearest"` or `"maximum"`. Parameters are validated before the PNG is
/// touched. A tile that already fits is returned byte for byte.
pub fn downsample_raster(png: &[u8], target_size: u32, scheme: &str, method: &str) -> Result<Vec<u8>> {
    if png.is_empty() {
        return Err(TileError::validation("empty PNG data"));
    }
    validate_target_size(target_size)?;
    let scheme: EncodingScheme = scheme.parse()?;
    let method: DownsampleMethod = method.parse()?;

    let raster = decode_png(png)?;
    if fits(&raster, target_size) {
        debug!(
            width = raster.width(),
            height = raster.height(),
            target_size,
            "tile already fits, returning input unchanged"
        );
        return Ok(png.to_vec());
    }

    let raster = downsample(raster, target_size, scheme, method)?;
    encode_png(&raster)
}

/// Decode an encoded PNG tile back into single-band elevations.
pub fn decode_terrain_container(png: &[u8], scheme: EncodingScheme) -> Result<ElevationGrid> {
    let raster = decode_png(png)?;
    let count = raster.as_bytes().len() / 3;

    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|_| TileError::Allocation {
            bytes: count.saturating_mul(std::mem::size_of::<f32>()),
        })?;
    values.extend(
        raster
            .as_bytes()
            .chunks_exact(3)
            .map(|p| scheme.decode([p[0], p[1], p[2]])),
    );

    Ok(ElevationGrid::new(raster.width(), raster.height(), 1, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32) -> ElevationGrid {
        let values = (0..width * height).map(|k| k as f32).collect();
        ElevationGrid::new(width, height, 1, values).unwrap()
    }

    #[test]
    fn test_crop_tile_border() {
        assert_eq!(crop_tile_border(&grid(257, 257)), RasterShape::new(256, 256));
        assert_eq!(crop_tile_border(&grid(257, 3)), RasterShape::new(256, 3));
        assert_eq!(crop_tile_border(&grid(4, 257)), RasterShape::new(4, 256));
        assert_eq!(crop_tile_border(&grid(256, 258)), RasterShape::new(256, 258));
    }

    #[test]
    fn test_encode_elevation_grid_uses_band_zero() {
        let values: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, -1.0, -2.0, -3.0, -4.0];
        let grid = ElevationGrid::new(2, 2, 2, values).unwrap();
        let raster = encode_elevation_grid(&grid, EncodingScheme::Terrarium).unwrap();

        assert_eq!(raster.pixel(1, 1), EncodingScheme::Terrarium.encode(4.0));
        assert_eq!(raster.pixel(0, 1), EncodingScheme::Terrarium.encode(3.0));
    }

    #[test]
    fn test_downsample_validates_before_decoding() {
        let err = downsample_raster(b"not a png", 2000, "mapbox", "average").unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));

        let err = downsample_raster(b"not a png", 256, "mapbox", "cubic").unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));

        let err = downsample_raster(b"not a png", 256, "mapbox", "average").unwrap_err();
        assert!(matches!(err, TileError::Container(_)));

        let err = downsample_raster(&[], 256, "mapbox", "average").unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));
    }
}
