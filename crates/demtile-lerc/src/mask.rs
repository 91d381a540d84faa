//! Validity mask and its run-length encoding.

use crate::reader::ByteReader;
use crate::{LercError, Result};

/// Run-length count that terminates an RLE stream.
const RLE_END: i16 = i16::MIN;

/// One bit per pixel, most significant bit first, set when the pixel is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BitMask {
    bits: Vec<u8>,
    len: usize,
}

impl BitMask {
    pub(crate) fn all_valid(len: usize) -> Self {
        Self {
            bits: vec![0xff; len.div_ceil(8)],
            len,
        }
    }

    pub(crate) fn all_invalid(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(8)],
            len,
        }
    }

    fn from_bytes(bits: Vec<u8>, len: usize) -> Result<Self> {
        if bits.len() != len.div_ceil(8) {
            return Err(LercError::decode(format!(
                "mask has {} bytes, expected {}",
                bits.len(),
                len.div_ceil(8)
            )));
        }
        Ok(Self { bits, len })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_valid(&self, k: usize) -> bool {
        self.bits[k >> 3] & (0x80 >> (k & 7)) != 0
    }

    pub(crate) fn count_valid(&self) -> usize {
        (0..self.len).filter(|&k| self.is_valid(k)).count()
    }
}

/// Expand an RLE stream into exactly `expected_len` bytes.
///
/// Counts are little-endian `i16`: positive for a literal run, negative for
/// one byte repeated, and `-32768` to end the stream.
pub(crate) fn rle_decompress(reader: &mut ByteReader<'_>, expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);

    loop {
        let count = reader.i16("mask run count")?;
        if count == RLE_END {
            break;
        }

        let run = count.unsigned_abs() as usize;
        if out.len() + run > expected_len {
            return Err(LercError::decode(format!(
                "mask run of {} bytes overflows {} byte mask",
                run, expected_len
            )));
        }

        if count > 0 {
            out.extend_from_slice(reader.bytes(run, "mask literal run")?);
        } else {
            let value = reader.u8("mask repeat value")?;
            out.resize(out.len() + run, value);
        }
    }

    if out.len() != expected_len {
        return Err(LercError::decode(format!(
            "mask decoded to {} bytes, expected {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}

/// Read the mask section of a band blob.
///
/// `previous` is the mask of the preceding band; a zero-length mask with a
/// partially valid band means "same as before".
pub(crate) fn read_mask(
    reader: &mut ByteReader<'_>,
    pixel_count: usize,
    valid_pixels: usize,
    previous: Option<&BitMask>,
) -> Result<BitMask> {
    let num_bytes = reader.i32("mask size")?;
    if num_bytes < 0 {
        return Err(LercError::decode(format!("negative mask size {}", num_bytes)));
    }

    if valid_pixels == 0 || valid_pixels == pixel_count {
        if num_bytes != 0 {
            return Err(LercError::decode(format!(
                "unexpected {} byte mask for a band with {} of {} pixels valid",
                num_bytes, valid_pixels, pixel_count
            )));
        }
        return Ok(if valid_pixels == 0 {
            BitMask::all_invalid(pixel_count)
        } else {
            BitMask::all_valid(pixel_count)
        });
    }

    if num_bytes == 0 {
        return match previous {
            Some(mask) if mask.len() == pixel_count => Ok(mask.clone()),
            _ => Err(LercError::decode("band reuses a mask but none precedes it")),
        };
    }

    let mut rle = ByteReader::new(reader.bytes(num_bytes as usize, "mask")?);
    let bits = rle_decompress(&mut rle, pixel_count.div_ceil(8))?;
    let mask = BitMask::from_bytes(bits, pixel_count)?;

    let counted = mask.count_valid();
    if counted != valid_pixels {
        return Err(LercError::decode(format!(
            "mask marks {} pixels valid, header declares {}",
            counted, valid_pixels
        )));
    }
    Ok(mask)
}
