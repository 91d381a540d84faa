//! Compressed raster decoding into an elevation grid.

use crate::info::blob_info;
use crate::lerc2::BandDecoder;
use crate::{BlobInfo, DataType, ElevationGrid, LercError, Result};
use tracing::debug;

/// Values per pixel this decoder requests from the decompressor.
const DECODE_DEPTH: i32 = 1;

/// Outcome of decoding a blob.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The decoded elevation grid.
    Grid(ElevationGrid),
    /// Every pixel of the blob is masked out; there is nothing to encode.
    NoData,
}

impl Decoded {
    /// The grid, if the blob had any valid pixels.
    pub fn into_grid(self) -> Option<ElevationGrid> {
        match self {
            Decoded::Grid(grid) => Some(grid),
            Decoded::NoData => None,
        }
    }
}

/// Decode a LERC blob of 32-bit float elevations.
///
/// Checks run in a fixed order: empty input and unreadable metadata are
/// format errors, then the declared shape, then the sample type. A blob with
/// no valid pixels yields [`Decoded::NoData`] without touching the body.
pub fn decode_compressed_raster(blob: &[u8]) -> Result<Decoded> {
    if blob.is_empty() {
        return Err(LercError::format("empty LERC data"));
    }

    let info = blob_info(blob)?;
    validate(&info)?;

    if info.valid_pixels <= 0 {
        debug!(cols = info.cols, rows = info.rows, "LERC blob has no valid pixels");
        return Ok(Decoded::NoData);
    }

    if info.depth != DECODE_DEPTH {
        return Err(LercError::decode(format!(
            "blob depth {} does not match requested depth {}",
            info.depth, DECODE_DEPTH
        )));
    }

    let values = decode_values(blob, &info)?;
    let grid = ElevationGrid::new(info.cols as u32, info.rows as u32, info.bands as u32, values)?;

    debug!(
        cols = info.cols,
        rows = info.rows,
        bands = info.bands,
        version = info.version,
        "decoded LERC blob"
    );
    Ok(Decoded::Grid(grid))
}

fn validate(info: &BlobInfo) -> Result<()> {
    if info.cols <= 0 || info.rows <= 0 || info.bands <= 0 {
        return Err(LercError::Shape {
            cols: info.cols,
            rows: info.rows,
            bands: info.bands,
        });
    }
    if info.data_type != DataType::Float {
        return Err(LercError::UnsupportedType(info.data_type));
    }
    Ok(())
}

/// Decode every band into one freshly allocated buffer.
fn decode_values(blob: &[u8], info: &BlobInfo) -> Result<Vec<f32>> {
    let plane = info.cols as usize * info.rows as usize;
    let total = plane
        .checked_mul(info.bands as usize)
        .ok_or(LercError::Allocation { bytes: usize::MAX })?;

    let mut values: Vec<f32> = Vec::new();
    values
        .try_reserve_exact(total)
        .map_err(|_| LercError::Allocation {
            bytes: total.saturating_mul(std::mem::size_of::<f32>()),
        })?;
    values.resize(total, 0.0);

    let mut decoder = BandDecoder::new();
    let mut offset = 0;
    for band in values.chunks_exact_mut(plane) {
        offset += decoder.decode_band(&blob[offset..], band)?;
    }
    Ok(values)
}
