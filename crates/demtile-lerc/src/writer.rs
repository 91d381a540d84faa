//! Minimal Lerc2 writer for building test blobs.
//!
//! Produces single-depth float bands using one-sweep or tiled encoding
//! (raw, zero, constant, bit-stuffed and lookup-table tiles). It is not a
//! general-purpose encoder: it favours predictable output over size.

use crate::bitstuff::{bits_for, stuff};
use crate::header::{fletcher32, CHECKSUM_START, FILE_KEY};
use crate::DataType;

/// Builder for a single Lerc2 band blob.
///
/// ```ignore
/// let blob = BlobWriter::new(4, 4, vec![0.0; 16]).version(4).write();
/// ```
#[derive(Debug, Clone)]
pub struct BlobWriter {
    cols: i32,
    rows: i32,
    values: Vec<f32>,
    valid: Option<Vec<bool>>,
    version: i32,
    data_type: DataType,
    max_z_error: f64,
    micro_block: i32,
    one_sweep: bool,
    lookup_tables: bool,
    no_data: Option<(f64, f64)>,
}

impl BlobWriter {
    /// Start a blob for `cols * rows` float values in row-major order.
    pub fn new(cols: i32, rows: i32, values: Vec<f32>) -> Self {
        Self {
            cols,
            rows,
            values,
            valid: None,
            version: 3,
            data_type: DataType::Float,
            max_z_error: 0.005,
            micro_block: 8,
            one_sweep: false,
            lookup_tables: false,
            no_data: None,
        }
    }

    /// Lerc2 version to emit (2 through 6).
    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Per-pixel validity; masked pixels are not stored.
    pub fn mask(mut self, valid: Vec<bool>) -> Self {
        self.valid = Some(valid);
        self
    }

    /// Data type code written to the header. Values are always stored as `f32`.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Quantization error bound for bit-stuffed tiles; zero stores raw tiles.
    pub fn max_z_error(mut self, max_z_error: f64) -> Self {
        self.max_z_error = max_z_error;
        self
    }

    /// Tile edge length.
    pub fn micro_block(mut self, micro_block: i32) -> Self {
        self.micro_block = micro_block;
        self
    }

    /// Store all valid values raw instead of tiling.
    pub fn one_sweep(mut self) -> Self {
        self.one_sweep = true;
        self
    }

    /// Use lookup tables for bit-stuffed tiles when they fit.
    pub fn lookup_tables(mut self) -> Self {
        self.lookup_tables = true;
        self
    }

    /// Version 6 no-data remapping: `placeholder` is stored, `original` is restored.
    pub fn no_data(mut self, placeholder: f64, original: f64) -> Self {
        self.no_data = Some((placeholder, original));
        self
    }

    /// Build the blob.
    pub fn write(&self) -> Vec<u8> {
        let pixel_count = (self.cols.max(0) as usize) * (self.rows.max(0) as usize);
        let valid: Vec<bool> = match &self.valid {
            Some(valid) => valid.clone(),
            None => vec![true; pixel_count],
        };
        let valid_values: Vec<f32> = (0..pixel_count)
            .filter(|&k| valid[k])
            .map(|k| self.values[k])
            .collect();
        let valid_count = valid_values.len();

        let (z_min, z_max) = valid_values
            .iter()
            .fold(None, |acc: Option<(f32, f32)>, &z| match acc {
                None => Some((z, z)),
                Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
            })
            .unwrap_or((0.0, 0.0));

        let mut buf = Vec::new();
        buf.extend_from_slice(FILE_KEY);
        put_i32(&mut buf, self.version);
        if self.version >= 3 {
            put_u32(&mut buf, 0);
        }
        put_i32(&mut buf, self.rows);
        put_i32(&mut buf, self.cols);
        if self.version >= 4 {
            put_i32(&mut buf, 1);
        }
        put_i32(&mut buf, valid_count as i32);
        put_i32(&mut buf, self.micro_block);
        let blob_size_at = buf.len();
        put_i32(&mut buf, 0);
        put_i32(&mut buf, self.data_type.code());
        if self.version >= 6 {
            put_i32(&mut buf, 0);
            buf.extend_from_slice(&[self.no_data.is_some() as u8, 0, 0, 0]);
        }
        put_f64(&mut buf, self.max_z_error);
        put_f64(&mut buf, z_min as f64);
        put_f64(&mut buf, z_max as f64);
        if self.version >= 6 {
            let (placeholder, original) = self.no_data.unwrap_or((0.0, 0.0));
            put_f64(&mut buf, placeholder);
            put_f64(&mut buf, original);
        }

        self.write_mask(&mut buf, &valid, valid_count, pixel_count);

        if valid_count > 0 && z_min != z_max {
            if self.version >= 4 {
                put_f32(&mut buf, z_min);
                put_f32(&mut buf, z_max);
            }
            if self.one_sweep {
                buf.push(1);
                for z in &valid_values {
                    put_f32(&mut buf, *z);
                }
            } else {
                buf.push(0);
                if self.version >= 6 && self.max_z_error == 0.0 {
                    buf.push(0);
                }
                self.write_tiles(&mut buf, &valid);
            }
        }

        let blob_size = buf.len() as i32;
        buf[blob_size_at..blob_size_at + 4].copy_from_slice(&blob_size.to_le_bytes());
        if self.version >= 3 {
            let checksum = fletcher32(&buf[CHECKSUM_START..]);
            buf[CHECKSUM_START - 4..CHECKSUM_START].copy_from_slice(&checksum.to_le_bytes());
        }
        buf
    }

    fn write_mask(&self, buf: &mut Vec<u8>, valid: &[bool], valid_count: usize, pixel_count: usize) {
        if valid_count == 0 || valid_count == pixel_count {
            put_i32(buf, 0);
            return;
        }

        let mut bits = vec![0u8; pixel_count.div_ceil(8)];
        for (k, _) in valid.iter().enumerate().filter(|(_, v)| **v) {
            bits[k >> 3] |= 0x80 >> (k & 7);
        }

        let mut rle = Vec::new();
        for chunk in bits.chunks(i16::MAX as usize) {
            rle.extend_from_slice(&(chunk.len() as i16).to_le_bytes());
            rle.extend_from_slice(chunk);
        }
        rle.extend_from_slice(&i16::MIN.to_le_bytes());

        put_i32(buf, rle.len() as i32);
        buf.extend_from_slice(&rle);
    }

    fn write_tiles(&self, buf: &mut Vec<u8>, valid: &[bool]) {
        let mb = self.micro_block as usize;
        let cols = self.cols as usize;
        let rows = self.rows as usize;

        for i0 in (0..rows).step_by(mb) {
            let i1 = (i0 + mb).min(rows);
            for j0 in (0..cols).step_by(mb) {
                let j1 = (j0 + mb).min(cols);
                let tile: Vec<f32> = (i0..i1)
                    .flat_map(|i| (j0..j1).map(move |j| i * cols + j))
                    .filter(|&k| valid[k])
                    .map(|k| self.values[k])
                    .collect();
                self.write_tile(buf, &tile, j0);
            }
        }
    }

    fn write_tile(&self, buf: &mut Vec<u8>, tile: &[f32], j0: usize) {
        let code = if self.version >= 5 {
            (((j0 >> 3) & 7) << 3) as u8
        } else {
            (((j0 >> 3) & 15) << 2) as u8
        };

        if tile.is_empty() || tile.iter().all(|&z| z == 0.0) {
            buf.push(code | 2);
            return;
        }

        if self.max_z_error == 0.0 {
            buf.push(code);
            for z in tile {
                put_f32(buf, *z);
            }
            return;
        }

        let offset = tile.iter().copied().fold(f32::INFINITY, f32::min);
        let scale = 2.0 * self.max_z_error;
        let quantized: Vec<u32> = tile
            .iter()
            .map(|&z| ((z as f64 - offset as f64) / scale).round() as u32)
            .collect();
        let max_n = quantized.iter().copied().max().unwrap_or(0);

        if max_n == 0 {
            buf.push(code | 3);
            put_f32(buf, offset);
            return;
        }

        buf.push(code | 1);
        put_f32(buf, offset);

        let mut table: Vec<u32> = quantized.clone();
        table.sort_unstable();
        table.dedup();

        let count = quantized.len();
        let (count_bits67, count_bytes): (u8, Vec<u8>) = if count < 256 {
            (2, vec![count as u8])
        } else if count < 65536 {
            (1, (count as u16).to_le_bytes().to_vec())
        } else {
            (0, (count as u32).to_le_bytes().to_vec())
        };

        let num_bits = bits_for(max_n);
        if self.lookup_tables && table.len() <= u8::MAX as usize {
            buf.push(num_bits as u8 | 0x20 | (count_bits67 << 6));
            buf.extend_from_slice(&count_bytes);
            buf.push(table.len() as u8);
            buf.extend(stuff(&table[1..], num_bits));
            let indexes: Vec<u32> = quantized
                .iter()
                .map(|n| table.binary_search(n).unwrap_or(0) as u32)
                .collect();
            buf.extend(stuff(&indexes, bits_for(table.len() as u32 - 1)));
        } else {
            buf.push(num_bits as u8 | (count_bits67 << 6));
            buf.extend_from_slice(&count_bytes);
            buf.extend(stuff(&quantized, num_bits));
        }
    }
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}
