//! PNG container for encoded rasters.
//!
//! Only 8-bit RGB images are accepted. Palette, grayscale, alpha and 16-bit
//! images are rejected rather than converted, since converting would change
//! the encoded elevations.

use crate::raster::alloc_bytes;
use crate::{Result, RgbRaster, TileError};
use png::{BitDepth, ColorType, Transformations};

/// Decode PNG bytes into an RGB raster.
pub fn decode_png(bytes: &[u8]) -> Result<RgbRaster> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| TileError::container(format!("PNG decode failed: {}", e)))?;

    let (color_type, bit_depth) = reader.output_color_type();
    if color_type != ColorType::Rgb || bit_depth != BitDepth::Eight {
        return Err(TileError::container(format!(
            "expected 8-bit RGB PNG, got {:?} at {} bits",
            color_type, bit_depth as u8
        )));
    }

    let mut buf = alloc_bytes(reader.output_buffer_size())?;
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| TileError::container(format!("PNG decode failed: {}", e)))?;
    buf.truncate(frame.buffer_size());

    RgbRaster::new(frame.width, frame.height, buf)
        .map_err(|e| TileError::container(format!("PNG frame does not match its header: {}", e)))
}

/// Encode an RGB raster as PNG bytes.
pub fn encode_png(raster: &RgbRaster) -> Result<Vec<u8>> {
    if raster.shape().is_empty() {
        return Err(TileError::container(format!(
            "cannot encode empty {}x{} raster",
            raster.width(),
            raster.height()
        )));
    }

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, raster.width(), raster.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| TileError::container(format!("PNG encode failed: {}", e)))?;
    writer
        .write_image_data(raster.as_bytes())
        .map_err(|e| TileError::container(format!("PNG encode failed: {}", e)))?;
    writer
        .finish()
        .map_err(|e| TileError::container(format!("PNG encode failed: {}", e)))?;

    Ok(out)
}
