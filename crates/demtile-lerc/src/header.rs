//! Lerc2 blob header.
//!
//! ## Header Layout
//!
//! All fields are little-endian.
//!
//! | Field                       | Type     | Versions |
//! |-----------------------------|----------|----------|
//! | file key `"Lerc2 "`         | 6 bytes  | all      |
//! | version                     | i32      | all      |
//! | checksum                    | u32      | >= 3     |
//! | rows, cols                  | 2 x i32  | all      |
//! | depth                       | i32      | >= 4     |
//! | valid pixels                | i32      | all      |
//! | micro block size            | i32      | all      |
//! | blob size                   | i32      | all      |
//! | data type                   | i32      | all      |
//! | blobs more                  | i32      | >= 6     |
//! | pass no-data, is-int, 2 x reserved | 4 x u8 | >= 6 |
//! | max z error, z min, z max   | 3 x f64  | all      |
//! | no-data, no-data original   | 2 x f64  | >= 6     |

use crate::reader::ByteReader;
use crate::{LercError, Result};
use std::fmt;

/// Magic bytes at the start of every Lerc2 blob.
pub const FILE_KEY: &[u8; 6] = b"Lerc2 ";

/// Newest Lerc2 version this crate understands.
pub const CURRENT_VERSION: i32 = 6;

/// Oldest Lerc2 version this crate can decode (earlier bit stuffing differs).
pub const MIN_DECODE_VERSION: i32 = 3;

/// Byte offset where checksummed content starts: key, version and checksum.
pub(crate) const CHECKSUM_START: usize = FILE_KEY.len() + 4 + 4;

/// Sample type stored in a Lerc2 blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Signed 8-bit integer.
    Char,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UShort,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UInt,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// A code outside the known range.
    Unknown(i32),
}

impl DataType {
    /// Wire code of this data type.
    pub fn code(self) -> i32 {
        match self {
            DataType::Char => 0,
            DataType::Byte => 1,
            DataType::Short => 2,
            DataType::UShort => 3,
            DataType::Int => 4,
            DataType::UInt => 5,
            DataType::Float => 6,
            DataType::Double => 7,
            DataType::Unknown(code) => code,
        }
    }

    /// Size of one sample in bytes, `None` for unknown codes.
    pub fn size(self) -> Option<usize> {
        match self {
            DataType::Char | DataType::Byte => Some(1),
            DataType::Short | DataType::UShort => Some(2),
            DataType::Int | DataType::UInt | DataType::Float => Some(4),
            DataType::Double => Some(8),
            DataType::Unknown(_) => None,
        }
    }
}

impl From<i32> for DataType {
    fn from(code: i32) -> Self {
        match code {
            0 => DataType::Char,
            1 => DataType::Byte,
            2 => DataType::Short,
            3 => DataType::UShort,
            4 => DataType::Int,
            5 => DataType::UInt,
            6 => DataType::Float,
            7 => DataType::Double,
            _ => DataType::Unknown(code),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Unknown(code) => write!(f, "Unknown ({})", code),
            known => write!(f, "{:?} ({})", known, known.code()),
        }
    }
}

/// Parsed header of a single Lerc2 band blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Lerc2Header {
    pub version: i32,
    pub checksum: u32,
    pub rows: i32,
    pub cols: i32,
    pub depth: i32,
    pub valid_pixels: i32,
    pub micro_block_size: i32,
    pub blob_size: i32,
    pub data_type: DataType,
    pub blobs_more: i32,
    pub pass_no_data: bool,
    pub is_int: bool,
    pub max_z_error: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub no_data: f64,
    pub no_data_orig: f64,
}

impl Lerc2Header {
    /// Parse a header from the reader.
    ///
    /// Only the structure is checked here; shape and type validation is left
    /// to the caller so metadata queries can report what the blob declares.
    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let key = reader.bytes(FILE_KEY.len(), "file key")?;
        if key != FILE_KEY {
            return Err(LercError::format(format!(
                "missing Lerc2 file key, found {:?}",
                String::from_utf8_lossy(key)
            )));
        }

        let version = reader.i32("version")?;
        if !(1..=CURRENT_VERSION).contains(&version) {
            return Err(LercError::format(format!(
                "unsupported Lerc2 version {} (max {})",
                version, CURRENT_VERSION
            )));
        }

        let checksum = if version >= 3 { reader.u32("checksum")? } else { 0 };
        let rows = reader.i32("rows")?;
        let cols = reader.i32("cols")?;
        let depth = if version >= 4 { reader.i32("depth")? } else { 1 };
        let valid_pixels = reader.i32("valid pixel count")?;
        let micro_block_size = reader.i32("micro block size")?;
        let blob_size = reader.i32("blob size")?;
        let data_type = DataType::from(reader.i32("data type")?);

        let (blobs_more, pass_no_data, is_int) = if version >= 6 {
            let blobs_more = reader.i32("blobs more")?;
            let flags = reader.bytes(4, "header flags")?;
            (blobs_more, flags[0] != 0, flags[1] != 0)
        } else {
            (0, false, false)
        };

        let max_z_error = reader.f64("max z error")?;
        let z_min = reader.f64("z min")?;
        let z_max = reader.f64("z max")?;

        let (no_data, no_data_orig) = if version >= 6 {
            (reader.f64("no-data value")?, reader.f64("original no-data value")?)
        } else {
            (0.0, 0.0)
        };

        let header = Self {
            version,
            checksum,
            rows,
            cols,
            depth,
            valid_pixels,
            micro_block_size,
            blob_size,
            data_type,
            blobs_more,
            pass_no_data,
            is_int,
            max_z_error,
            z_min,
            z_max,
            no_data,
            no_data_orig,
        };

        if header.blob_size < reader.position() as i32 {
            return Err(LercError::format(format!(
                "blob size {} is smaller than the header ({} bytes)",
                header.blob_size,
                reader.position()
            )));
        }

        Ok(header)
    }

    /// Number of pixels per band, if the shape is positive and fits.
    pub fn pixel_count(&self) -> Option<usize> {
        if self.rows <= 0 || self.cols <= 0 {
            return None;
        }
        (self.rows as usize).checked_mul(self.cols as usize)
    }
}

/// Fletcher-32 checksum as computed by the Lerc2 writer.
///
/// Bytes are paired big-endian into 16-bit words; an odd trailing byte is
/// treated as the high half of a final word.
pub fn fletcher32(data: &[u8]) -> u32 {
    let mut sum1: u32 = 0xffff;
    let mut sum2: u32 = 0xffff;

    let mut words = data.chunks_exact(2);
    // 359 words is the largest block that cannot overflow the 32-bit sums.
    loop {
        let mut block = 0;
        while block < 359 {
            match words.next() {
                Some(pair) => {
                    sum1 += (pair[0] as u32) << 8;
                    sum1 += pair[1] as u32;
                    sum2 += sum1;
                    block += 1;
                }
                None => break,
            }
        }
        if block == 0 {
            break;
        }
        sum1 = (sum1 & 0xffff) + (sum1 >> 16);
        sum2 = (sum2 & 0xffff) + (sum2 >> 16);
    }

    if let [last] = words.remainder() {
        sum1 += (*last as u32) << 8;
        sum2 += sum1;
    }

    sum1 = (sum1 & 0xffff) + (sum1 >> 16);
    sum2 = (sum2 & 0xffff) + (sum2 >> 16);

    (sum2 << 16) | sum1
}
