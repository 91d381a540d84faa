//! Bit-stuffed unsigned integer arrays (Lerc2 version 3 and later).
//!
//! ## Block Format
//!
//! | Field        | Size          | Description                                          |
//! |--------------|---------------|------------------------------------------------------|
//! | header       | 1             | bits 0-4: bits per value, bit 5: lookup table, bits 6-7: count width |
//! | count        | 4 / 2 / 1     | number of values; bits 6-7 = 0, 1, 2 select 4, 2, 1 bytes |
//! | lut size     | 1 (lut only)  | number of table entries including the implicit zero |
//! | lut values   | packed        | `lut size - 1` values at the header bit width          |
//! | data         | packed        | values, or table indexes at the minimal index width  |
//!
//! Packed values are little-endian, least significant bit first, and the
//! trailing partial word is truncated to the bytes it actually uses.

use crate::reader::ByteReader;
use crate::{LercError, Result};

/// Decode one bit-stuffed block, allowing at most `max_count` values.
pub(crate) fn decode(reader: &mut ByteReader<'_>, max_count: usize) -> Result<Vec<u32>> {
    let header = reader.u8("bit stuffing header")?;
    let count_width = match header >> 6 {
        0 => 4,
        1 => 2,
        2 => 1,
        _ => return Err(LercError::decode("invalid bit-stuffed count width")),
    };
    let use_lut = header & 0x20 != 0;
    let num_bits = (header & 0x1f) as u32;

    let count = match count_width {
        1 => reader.u8("value count")? as usize,
        2 => reader.u16("value count")? as usize,
        _ => reader.u32("value count")? as usize,
    };
    if count > max_count {
        return Err(LercError::decode(format!(
            "bit-stuffed block holds {} values, tile has room for {}",
            count, max_count
        )));
    }

    if !use_lut {
        if num_bits == 0 {
            return Ok(vec![0; count]);
        }
        return unstuff(reader, count, num_bits);
    }

    if num_bits == 0 {
        return Err(LercError::decode("lookup table with zero bit width"));
    }
    let lut_size = reader.u8("lookup table size")? as usize;
    if lut_size < 2 {
        return Err(LercError::decode(format!("lookup table size {} is too small", lut_size)));
    }

    // The stored table omits its leading zero entry.
    let mut lut = Vec::with_capacity(lut_size);
    lut.push(0);
    lut.extend(unstuff(reader, lut_size - 1, num_bits)?);

    let index_bits = bits_for((lut_size - 1) as u32);
    let indexes = unstuff(reader, count, index_bits)?;

    indexes
        .into_iter()
        .map(|i| {
            lut.get(i as usize).copied().ok_or_else(|| {
                LercError::decode(format!("lookup index {} outside table of {}", i, lut.len()))
            })
        })
        .collect()
}

/// Unpack `count` values of `num_bits` each.
fn unstuff(reader: &mut ByteReader<'_>, count: usize, num_bits: u32) -> Result<Vec<u32>> {
    if count == 0 {
        return Err(LercError::decode("bit-stuffed block with no values"));
    }
    if num_bits >= 32 {
        return Err(LercError::decode(format!("bit width {} out of range", num_bits)));
    }

    let total_bits = (count as u64) * num_bits as u64;
    let num_bytes = total_bits.div_ceil(8) as usize;
    let bytes = reader.bytes(num_bytes, "bit-stuffed values")?;

    let mask = (1u64 << num_bits) - 1;
    let mut out = Vec::with_capacity(count);
    let mut acc: u64 = 0;
    let mut acc_bits = 0u32;
    let mut src = bytes.iter();

    for _ in 0..count {
        while acc_bits < num_bits {
            // Length was checked above, so the iterator cannot run dry.
            let byte = src.next().copied().unwrap_or(0);
            acc |= (byte as u64) << acc_bits;
            acc_bits += 8;
        }
        out.push((acc & mask) as u32);
        acc >>= num_bits;
        acc_bits -= num_bits;
    }

    Ok(out)
}

/// Number of bits needed to store `max_value`.
pub(crate) fn bits_for(max_value: u32) -> u32 {
    u32::BITS - max_value.leading_zeros()
}

#[cfg(any(test, feature = "test-util"))]
pub(crate) fn stuff(values: &[u32], num_bits: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((values.len() * num_bits as usize).div_ceil(8));
    let mut acc: u64 = 0;
    let mut acc_bits = 0u32;
    for &value in values {
        acc |= (value as u64) << acc_bits;
        acc_bits += num_bits;
        while acc_bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            acc_bits -= 8;
        }
    }
    if acc_bits > 0 {
        out.push(acc as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstuff_lsb_first() {
        // 3-bit values 1, 2, 3, 4 packed from the LSB:
        // byte0 = 0b11_010_001 = 0xd1, byte1 = 0b0000_100_0 = 0x08
        let bytes = [0xd1, 0x08];
        let out = unstuff(&mut ByteReader::new(&bytes), 4, 3).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stuff_matches_unstuff() {
        let values: Vec<u32> = (0..37).map(|i| (i * 7919) % 2048).collect();
        let packed = stuff(&values, 11);
        assert_eq!(packed.len(), (37 * 11usize).div_ceil(8));
        let mut reader = ByteReader::new(&packed);
        assert_eq!(unstuff(&mut reader, values.len(), 11).unwrap(), values);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_decode_plain_block() {
        let values = [5u32, 0, 7, 3];
        let mut block = vec![3u8 | (2 << 6), 4];
        block.extend(stuff(&values, 3));
        let out = decode(&mut ByteReader::new(&block), 16).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn test_decode_zero_width_block() {
        let block = [(2 << 6) as u8, 6];
        let out = decode(&mut ByteReader::new(&block), 16).unwrap();
        assert_eq!(out, vec![0; 6]);
    }

    #[test]
    fn test_decode_lut_block() {
        // Table [0, 1000, 4000]: two stored entries at 12 bits, indexes at 2 bits.
        let indexes = [2u32, 0, 1, 1, 2];
        let mut block = vec![12u8 | 0x20 | (2 << 6), indexes.len() as u8, 3];
        block.extend(stuff(&[1000, 4000], 12));
        block.extend(stuff(&indexes, 2));
        let out = decode(&mut ByteReader::new(&block), 16).unwrap();
        assert_eq!(out, vec![4000, 0, 1000, 1000, 4000]);
    }

    #[test]
    fn test_decode_rejects_oversized_count() {
        let block = [(2 << 6) as u8, 200];
        assert!(decode(&mut ByteReader::new(&block), 64).is_err());
    }

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(0), 0);
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(2), 2);
        assert_eq!(bits_for(255), 8);
        assert_eq!(bits_for(256), 9);
    }
}
