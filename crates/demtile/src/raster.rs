//! Interleaved 8-bit RGB raster.

use crate::{Result, TileError};
use demtile_lerc::RasterShape;

/// Bytes per RGB pixel.
pub const CHANNELS: usize = 3;

/// An 8-bit RGB raster with pixels stored row-major as `r, g, b` triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbRaster {
    /// Wrap `data`, which must hold exactly `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height);
        if expected != Some(data.len()) {
            return Err(TileError::validation(format!(
                "{}x{} RGB raster needs {} bytes, got {}",
                width,
                height,
                width as u64 * height as u64 * CHANNELS as u64,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// A black raster, allocated fallibly.
    pub(crate) fn zeroed(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height).ok_or(TileError::Allocation { bytes: usize::MAX })?;
        Ok(Self {
            width,
            height,
            data: alloc_bytes(len)?,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    pub fn shape(&self) -> RasterShape {
        RasterShape::new(self.width, self.height)
    }

    /// The pixel at (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the raster.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&pixel);
    }

    /// The raw interleaved bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the raster and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} raster",
            x,
            y,
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
}

/// A zero-filled byte buffer, reporting exhaustion instead of aborting.
pub(crate) fn alloc_bytes(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TileError::Allocation { bytes: len })?;
    data.resize(len, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(RgbRaster::new(2, 2, vec![0; 12]).is_ok());
        let err = RgbRaster::new(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(err, TileError::Validation(_)));
    }

    #[test]
    fn test_pixel_access() {
        let mut raster = RgbRaster::zeroed(3, 2).unwrap();
        raster.set_pixel(2, 1, [7, 8, 9]);

        assert_eq!(raster.pixel(2, 1), [7, 8, 9]);
        assert_eq!(raster.pixel(0, 0), [0, 0, 0]);
        assert_eq!(&raster.as_bytes()[15..], &[7, 8, 9]);
        assert_eq!(raster.shape(), RasterShape::new(3, 2));
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_bounds() {
        RgbRaster::zeroed(2, 2).unwrap().pixel(2, 0);
    }
}
