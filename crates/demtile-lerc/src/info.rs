//! Blob metadata, the equivalent of the LERC C API `getBlobInfo` query.

use crate::header::{Lerc2Header, FILE_KEY};
use crate::reader::ByteReader;
use crate::{DataType, LercError, Result};

/// Metadata of a (possibly multi-band) Lerc2 blob.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlobInfo {
    /// Lerc2 version of the first band.
    pub version: i32,
    /// Sample type.
    pub data_type: DataType,
    /// Values per pixel.
    pub depth: i32,
    /// Number of columns.
    pub cols: i32,
    /// Number of rows.
    pub rows: i32,
    /// Number of concatenated band blobs.
    pub bands: i32,
    /// Valid (unmasked) pixels in the first band.
    pub valid_pixels: i32,
    /// Total size of all band blobs in bytes.
    pub blob_size: usize,
    /// Smallest value over all bands.
    pub z_min: f64,
    /// Largest value over all bands.
    pub z_max: f64,
    /// Largest error bound used by any band.
    pub max_z_error: f64,
}

/// Read the metadata of a blob without decoding any values.
///
/// Bands are counted by walking the concatenated band blobs; trailing bytes
/// that do not start with a Lerc2 header are ignored.
pub fn blob_info(blob: &[u8]) -> Result<BlobInfo> {
    if blob.is_empty() {
        return Err(LercError::format("empty LERC data"));
    }

    let first = read_header(blob).map_err(|e| info_failed(&e))?;
    let mut info = BlobInfo {
        version: first.version,
        data_type: first.data_type,
        depth: first.depth,
        cols: first.cols,
        rows: first.rows,
        bands: 1,
        valid_pixels: first.valid_pixels,
        blob_size: first.blob_size as usize,
        z_min: first.z_min,
        z_max: first.z_max,
        max_z_error: first.max_z_error,
    };

    if info.blob_size > blob.len() {
        return Err(info_failed(&LercError::format(format!(
            "blob declares {} bytes but only {} are present",
            info.blob_size,
            blob.len()
        ))));
    }

    while blob.len() - info.blob_size > FILE_KEY.len() {
        let rest = &blob[info.blob_size..];
        if !rest.starts_with(FILE_KEY) {
            break;
        }
        let next = read_header(rest).map_err(|e| info_failed(&e))?;

        if next.cols != info.cols
            || next.rows != info.rows
            || next.depth != info.depth
            || next.data_type != info.data_type
        {
            return Err(info_failed(&LercError::format(format!(
                "band {} is {}x{}x{} {}, first band is {}x{}x{} {}",
                info.bands,
                next.cols,
                next.rows,
                next.depth,
                next.data_type,
                info.cols,
                info.rows,
                info.depth,
                info.data_type
            ))));
        }
        let size = next.blob_size as usize;
        if size > rest.len() {
            return Err(info_failed(&LercError::format(format!(
                "band {} declares {} bytes but only {} remain",
                info.bands,
                size,
                rest.len()
            ))));
        }

        info.bands += 1;
        info.blob_size += size;
        info.z_min = info.z_min.min(next.z_min);
        info.z_max = info.z_max.max(next.z_max);
        info.max_z_error = info.max_z_error.max(next.max_z_error);
    }

    Ok(info)
}

fn read_header(blob: &[u8]) -> Result<Lerc2Header> {
    Lerc2Header::read(&mut ByteReader::new(blob))
}

fn info_failed(err: &LercError) -> LercError {
    let detail = match err {
        LercError::Format(message) | LercError::Decode(message) => message.clone(),
        other => other.to_string(),
    };
    LercError::format(format!("blob info failed: {}", detail))
}
