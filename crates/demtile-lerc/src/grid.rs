//! Dense elevation grid produced by the decoder.

use crate::{LercError, Result};

/// Width and height of a raster in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterShape {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RasterShape {
    /// Create a new shape.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels, or `None` on overflow.
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Elevation values in row-major order, one plane per band.
///
/// Band `b` occupies `values[b * width * height .. (b + 1) * width * height]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    width: u32,
    height: u32,
    bands: u32,
    values: Vec<f32>,
}

impl ElevationGrid {
    /// Create a grid, checking that `values` holds exactly `width * height * bands` entries.
    pub fn new(width: u32, height: u32, bands: u32, values: Vec<f32>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(bands as usize));
        if expected != Some(values.len()) {
            return Err(LercError::Shape {
                cols: width as i32,
                rows: height as i32,
                bands: bands as i32,
            });
        }
        Ok(Self {
            width,
            height,
            bands,
            values,
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

    /// Number of bands.
    pub fn bands(&self) -> u32 {
        self.bands
    }

    /// Width and height.
    pub fn shape(&self) -> RasterShape {
        RasterShape::new(self.width, self.height)
    }

    /// All values, band after band.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consume the grid and return its values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// The plane of band `band`, if it exists.
    pub fn band(&self, band: u32) -> Option<&[f32]> {
        if band >= self.bands {
            return None;
        }
        let plane = self.width as usize * self.height as usize;
        let start = band as usize * plane;
        self.values.get(start..start + plane)
    }

    /// Elevation of the first band at pixel (`x`, `y`).
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
