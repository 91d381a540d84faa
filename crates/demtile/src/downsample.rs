//! Square downsampling of encoded elevation rasters.
//!
//! Output pixel `(ox, oy)` samples the source at `(ox * s, oy * s)` where
//! `s = source_width / target_size`. Average and maximum aggregate the 2x2
//! block at that sample regardless of `s`, so for `s > 2` most of the source
//! block is skipped. Sample coordinates are clamped to the source raster.

use crate::{EncodingScheme, Result, RgbRaster, TileError};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Largest accepted output edge length.
pub const MAX_TARGET_SIZE: u32 = 1024;

/// How source pixels are combined into one output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DownsampleMethod {
    /// Copy the sampled pixel's bytes unchanged.
    Nearest,
    /// Mean elevation of the 2x2 block, re-encoded.
    #[default]
    Average,
    /// Highest elevation of the 2x2 block, re-encoded.
    Maximum,
}

impl DownsampleMethod {
    /// Identifier used on the command line and in [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            DownsampleMethod::Nearest => "nearest",
            DownsampleMethod::Average => "average",
            DownsampleMethod::Maximum => "maximum",
        }
    }
}

impl fmt::Display for DownsampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownsampleMethod {
    type Err = TileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(DownsampleMethod::Nearest),
            "average" => Ok(DownsampleMethod::Average),
            "maximum" => Ok(DownsampleMethod::Maximum),
            other => Err(TileError::validation(format!(
                "unknown downsample method {:?} (expected \"average\", \"nearest\" or \"maximum\")",
                other
            ))),
        }
    }
}

/// Reject target sizes outside `1..=MAX_TARGET_SIZE`.
pub fn validate_target_size(target_size: u32) -> Result<()> {
    if target_size == 0 || target_size > MAX_TARGET_SIZE {
        return Err(TileError::validation(format!(
            "target size {} outside 1..={}",
            target_size, MAX_TARGET_SIZE
        )));
    }
    Ok(())
}

/// Whether `raster` already fits in a `target_size` square.
pub(crate) fn fits(raster: &RgbRaster, target_size: u32) -> bool {
    raster.width() <= target_size && raster.height() <= target_size
}

/// Downsample `raster` to `target_size x target_size`.
///
/// Rasters that already fit are returned unchanged. A source narrower than
/// `target_size` gives a scale of zero, so every output pixel samples the
/// block at the origin.
pub fn downsample(
    raster: RgbRaster,
    target_size: u32,
    scheme: EncodingScheme,
    method: DownsampleMethod,
) -> Result<RgbRaster> {
    validate_target_size(target_size)?;
    if raster.shape().is_empty() {
        return Err(TileError::validation(format!(
            "cannot downsample empty {}x{} raster",
            raster.width(),
            raster.height()
        )));
    }
    if fits(&raster, target_size) {
        return Ok(raster);
    }

    let scale = raster.width() / target_size;
    debug!(
        width = raster.width(),
        height = raster.height(),
        target_size,
        scale,
        %scheme,
        %method,
        "downsampling raster"
    );

    let sampler = Sampler {
        source: &raster,
        scheme,
    };
    let mut out = RgbRaster::zeroed(target_size, target_size)?;
    for oy in 0..target_size {
        for ox in 0..target_size {
            let x = ox as u64 * scale as u64;
            let y = oy as u64 * scale as u64;
            let pixel = match method {
                DownsampleMethod::Nearest => sampler.pixel(x, y),
                DownsampleMethod::Average => sampler.average(x, y),
                DownsampleMethod::Maximum => sampler.maximum(x, y),
            };
            out.set_pixel(ox, oy, pixel);
        }
    }
    Ok(out)
}

struct Sampler<'a> {
    source: &'a RgbRaster,
    scheme: EncodingScheme,
}

impl Sampler<'_> {
    fn pixel(&self, x: u64, y: u64) -> [u8; 3] {
        let x = x.min(self.source.width() as u64 - 1) as u32;
        let y = y.min(self.source.height() as u64 - 1) as u32;
        self.source.pixel(x, y)
    }

    /// Elevations of the 2x2 block at (`x`, `y`) in row order.
    fn block(&self, x: u64, y: u64) -> [f32; 4] {
        [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
            .map(|(x, y)| self.scheme.decode(self.pixel(x, y)))
    }

    fn average(&self, x: u64, y: u64) -> [u8; 3] {
        let [a, b, c, d] = self.block(x, y);
        self.scheme.encode((a + b + c + d) * 0.25)
    }

    fn maximum(&self, x: u64, y: u64) -> [u8; 3] {
        let [a, b, c, d] = self.block(x, y);
        self.scheme.encode(a.max(b).max(c).max(d))
    }
}
