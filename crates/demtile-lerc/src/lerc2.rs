//! Lerc2 band decompressor.
//!
//! A band blob is laid out as header, mask, optional per-depth ranges, one
//! flag byte, then either every valid value raw ("one sweep") or a grid of
//! micro block tiles. Multi-band blobs are plain concatenations of band
//! blobs sharing shape and data type.

use crate::bitstuff;
use crate::header::{fletcher32, Lerc2Header, CHECKSUM_START, MIN_DECODE_VERSION};
use crate::mask::{read_mask, BitMask};
use crate::reader::ByteReader;
use crate::{DataType, LercError, Result};
use tracing::trace;

/// Largest micro block edge the format allows.
const MAX_MICRO_BLOCK: i32 = 32;

/// Tile compression modes stored in the low two bits of the tile byte.
const TILE_RAW: u8 = 0;
const TILE_STUFFED: u8 = 1;
const TILE_ZERO: u8 = 2;
const TILE_CONST: u8 = 3;

/// Image encode mode byte value for plain tiling.
const ENCODE_MODE_TILING: u8 = 0;

/// Decodes consecutive band blobs, carrying the validity mask between bands.
#[derive(Debug, Default)]
pub(crate) struct BandDecoder {
    previous_mask: Option<BitMask>,
}

impl BandDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decode the band blob at the start of `blob` into `out`.
    ///
    /// `out` must hold `rows * cols * depth` values. Returns the number of
    /// bytes the band occupied.
    pub(crate) fn decode_band(&mut self, blob: &[u8], out: &mut [f32]) -> Result<usize> {
        let mut reader = ByteReader::new(blob);
        let header = Lerc2Header::read(&mut reader).map_err(as_decode)?;
        let header_len = reader.position();

        if header.version < MIN_DECODE_VERSION {
            return Err(LercError::decode(format!(
                "Lerc2 version {} cannot be decoded (min {})",
                header.version, MIN_DECODE_VERSION
            )));
        }

        let blob_size = header.blob_size as usize;
        if blob_size > blob.len() {
            return Err(LercError::decode(format!(
                "blob declares {} bytes but only {} are present",
                blob_size,
                blob.len()
            )));
        }

        let checksum = fletcher32(&blob[CHECKSUM_START..blob_size]);
        if checksum != header.checksum {
            return Err(LercError::decode(format!(
                "checksum mismatch: expected {:#010x}, got {:#010x}",
                header.checksum, checksum
            )));
        }

        let pixel_count = header.pixel_count().ok_or_else(|| {
            LercError::decode(format!("invalid band shape {}x{}", header.cols, header.rows))
        })?;
        if header.depth <= 0 {
            return Err(LercError::decode(format!("invalid depth {}", header.depth)));
        }
        let depth = header.depth as usize;
        if header.valid_pixels < 0 || header.valid_pixels as usize > pixel_count {
            return Err(LercError::decode(format!(
                "valid pixel count {} outside 0..={}",
                header.valid_pixels, pixel_count
            )));
        }
        if out.len() != pixel_count * depth {
            return Err(LercError::decode(format!(
                "output holds {} values, band needs {}",
                out.len(),
                pixel_count * depth
            )));
        }

        // Restrict further reads to this band's bytes.
        let mut reader = ByteReader::new(&blob[..blob_size]);
        reader.bytes(header_len, "header")?;

        let mask = read_mask(
            &mut reader,
            pixel_count,
            header.valid_pixels as usize,
            self.previous_mask.as_ref(),
        )?;

        out.fill(0.0);
        let band = Band {
            header: &header,
            mask: &mask,
            depth,
        };

        if header.valid_pixels > 0 {
            band.decode_values(&mut reader, out)?;
        }

        trace!(
            rows = header.rows,
            cols = header.cols,
            valid = header.valid_pixels,
            bytes = blob_size,
            "decoded Lerc2 band"
        );

        self.previous_mask = Some(mask);
        Ok(blob_size)
    }
}

/// Per-band decoding state.
struct Band<'a> {
    header: &'a Lerc2Header,
    mask: &'a BitMask,
    depth: usize,
}

impl Band<'_> {
    fn decode_values(&self, reader: &mut ByteReader<'_>, out: &mut [f32]) -> Result<()> {
        let hd = self.header;

        if hd.z_min == hd.z_max {
            self.fill_const(out, &vec![hd.z_min; self.depth]);
            return Ok(());
        }

        let mut z_max_vec = vec![hd.z_max; self.depth];
        if hd.version >= 4 {
            let z_min_vec = self.read_ranges(reader, "depth minimum")?;
            let ranges_max = self.read_ranges(reader, "depth maximum")?;
            if z_min_vec == ranges_max {
                self.fill_const(out, &z_min_vec);
                return Ok(());
            }
            if self.depth > 1 {
                z_max_vec = ranges_max;
            }
        }

        let one_sweep = reader.u8("one sweep flag")? != 0;
        if one_sweep {
            return self.read_one_sweep(reader, out);
        }

        if let Some(mode) = self.read_encode_mode(reader)? {
            if mode != ENCODE_MODE_TILING {
                return Err(LercError::decode(format!(
                    "image encode mode {} (Huffman / lossless float) is not supported",
                    mode
                )));
            }
        }

        self.read_tiles(reader, out, &z_max_vec)?;
        self.restore_no_data(out);
        Ok(())
    }

    /// Versions that may entropy-code the image carry an extra mode byte.
    fn read_encode_mode(&self, reader: &mut ByteReader<'_>) -> Result<Option<u8>> {
        let hd = self.header;
        let huffman_int =
            matches!(hd.data_type, DataType::Char | DataType::Byte) && hd.max_z_error == 0.5;
        let huffman_float = hd.version >= 6
            && matches!(hd.data_type, DataType::Float | DataType::Double)
            && hd.max_z_error == 0.0;

        if huffman_int || huffman_float {
            Ok(Some(reader.u8("image encode mode")?))
        } else {
            Ok(None)
        }
    }

    fn read_ranges(&self, reader: &mut ByteReader<'_>, what: &str) -> Result<Vec<f64>> {
        (0..self.depth)
            .map(|_| read_sample(reader, self.header.data_type, what))
            .collect()
    }

    fn fill_const(&self, out: &mut [f32], values: &[f64]) {
        for k in 0..self.mask.len() {
            if self.mask.is_valid(k) {
                for (m, &z) in values.iter().enumerate() {
                    out[k * self.depth + m] = z as f32;
                }
            }
        }
    }

    fn read_one_sweep(&self, reader: &mut ByteReader<'_>, out: &mut [f32]) -> Result<()> {
        for k in 0..self.mask.len() {
            if self.mask.is_valid(k) {
                for m in 0..self.depth {
                    out[k * self.depth + m] =
                        read_sample(reader, self.header.data_type, "one sweep value")? as f32;
                }
            }
        }
        self.restore_no_data(out);
        Ok(())
    }

    fn read_tiles(&self, reader: &mut ByteReader<'_>, out: &mut [f32], z_max: &[f64]) -> Result<()> {
        let hd = self.header;
        let mb = hd.micro_block_size;
        if mb <= 0 || mb > MAX_MICRO_BLOCK {
            return Err(LercError::decode(format!(
                "micro block size {} outside 1..={}",
                mb, MAX_MICRO_BLOCK
            )));
        }

        let mb = mb as usize;
        let rows = hd.rows as usize;
        let cols = hd.cols as usize;

        for i0 in (0..rows).step_by(mb) {
            let i1 = (i0 + mb).min(rows);
            for j0 in (0..cols).step_by(mb) {
                let j1 = (j0 + mb).min(cols);
                for dim in 0..self.depth {
                    let tile = Tile { i0, i1, j0, j1, dim };
                    self.read_tile(reader, out, &tile, z_max[dim])?;
                }
            }
        }
        Ok(())
    }

    fn read_tile(
        &self,
        reader: &mut ByteReader<'_>,
        out: &mut [f32],
        tile: &Tile,
        z_max: f64,
    ) -> Result<()> {
        let hd = self.header;
        let flag = reader.u8("tile flag")?;
        let bits67 = flag >> 6;

        let (diff, code, expected) = if hd.version >= 5 {
            (flag & 0x04 != 0, (flag >> 3) & 7, (tile.j0 >> 3) & 7)
        } else {
            (false, (flag >> 2) & 15, (tile.j0 >> 3) & 15)
        };
        if code as usize != expected {
            return Err(LercError::decode(format!(
                "tile integrity check failed at row {}, col {}",
                tile.i0, tile.j0
            )));
        }
        if diff && tile.dim == 0 {
            return Err(LercError::decode("first depth slice cannot be diff encoded"));
        }

        let cols = hd.cols as usize;
        let depth = self.depth;
        // Value of the previous depth slice, added back for diff encoded tiles.
        let base = |out: &[f32], m: usize| if diff { out[m - 1] as f64 } else { 0.0 };

        match flag & 3 {
            TILE_ZERO => {
                for k in tile.valid_pixels(self.mask, cols) {
                    let m = k * depth + tile.dim;
                    let z = base(out, m);
                    out[m] = z as f32;
                }
            }
            TILE_RAW => {
                for k in tile.valid_pixels(self.mask, cols) {
                    let m = k * depth + tile.dim;
                    let z = read_sample(reader, hd.data_type, "raw tile value")? + base(out, m);
                    out[m] = z as f32;
                }
            }
            mode => {
                let offset_type = self.offset_type(bits67)?;
                let offset = read_sample(reader, offset_type, "tile offset")?;

                if mode == TILE_CONST {
                    for k in tile.valid_pixels(self.mask, cols) {
                        let m = k * depth + tile.dim;
                        let z = offset + base(out, m);
                        out[m] = z as f32;
                    }
                    return Ok(());
                }
                debug_assert_eq!(mode, TILE_STUFFED);

                let values = bitstuff::decode(reader, tile.pixel_count())?;
                let inv_scale = 2.0 * hd.max_z_error;
                let dequantize = |n: u32, prev: f64| {
                    let z = offset + n as f64 * inv_scale;
                    if diff {
                        z + prev
                    } else {
                        z.min(z_max)
                    }
                };

                if values.len() == tile.pixel_count() {
                    // Stored for every pixel, valid or not.
                    for (k, &n) in tile.all_pixels(cols).zip(values.iter()) {
                        let m = k * depth + tile.dim;
                        let z = dequantize(n, base(out, m));
                        out[m] = z as f32;
                    }
                } else {
                    let mut values = values.into_iter();
                    for k in tile.valid_pixels(self.mask, cols) {
                        let n = values.next().ok_or_else(|| {
                            LercError::decode(format!(
                                "tile at row {}, col {} ran out of values",
                                tile.i0, tile.j0
                            ))
                        })?;
                        let m = k * depth + tile.dim;
                        let z = dequantize(n, base(out, m));
                        out[m] = z as f32;
                    }
                }
            }
        }
        Ok(())
    }

    /// Type used for a tile offset, which the writer may narrow.
    fn offset_type(&self, reduction: u8) -> Result<DataType> {
        let dt = self.header.data_type;
        let tc = reduction as i32;
        let used = match dt {
            DataType::Short | DataType::Int => DataType::from(dt.code() - tc),
            DataType::UShort | DataType::UInt => DataType::from(dt.code() - 2 * tc),
            DataType::Float => match tc {
                0 => DataType::Float,
                1 => DataType::Short,
                _ => DataType::Byte,
            },
            DataType::Double => match tc {
                0 => DataType::Double,
                _ => DataType::from(dt.code() - 2 * tc + 1),
            },
            other => other,
        };
        match used {
            DataType::Unknown(code) => Err(LercError::decode(format!(
                "invalid offset type reduction {} for {} (code {})",
                reduction, dt, code
            ))),
            used => Ok(used),
        }
    }

    /// Map the stored no-data placeholder back to the caller's no-data value.
    fn restore_no_data(&self, out: &mut [f32]) {
        let hd = self.header;
        if hd.version < 6 || !hd.pass_no_data || hd.no_data == hd.no_data_orig {
            return;
        }
        let placeholder = hd.no_data as f32;
        let original = hd.no_data_orig as f32;
        for k in 0..self.mask.len() {
            if self.mask.is_valid(k) {
                for value in &mut out[k * self.depth..(k + 1) * self.depth] {
                    if *value == placeholder {
                        *value = original;
                    }
                }
            }
        }
    }
}

/// A micro block: rows `i0..i1`, columns `j0..j1` of one depth slice.
struct Tile {
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
    dim: usize,
}

impl Tile {
    fn pixel_count(&self) -> usize {
        (self.i1 - self.i0) * (self.j1 - self.j0)
    }

    fn all_pixels(&self, cols: usize) -> impl Iterator<Item = usize> + '_ {
        (self.i0..self.i1).flat_map(move |i| (self.j0..self.j1).map(move |j| i * cols + j))
    }

    fn valid_pixels<'m>(&'m self, mask: &'m BitMask, cols: usize) -> impl Iterator<Item = usize> + 'm {
        self.all_pixels(cols).filter(move |&k| mask.is_valid(k))
    }
}

fn read_sample(reader: &mut ByteReader<'_>, data_type: DataType, what: &str) -> Result<f64> {
    Ok(match data_type {
        DataType::Char => reader.i8(what)? as f64,
        DataType::Byte => reader.u8(what)? as f64,
        DataType::Short => reader.i16(what)? as f64,
        DataType::UShort => reader.u16(what)? as f64,
        DataType::Int => reader.i32(what)? as f64,
        DataType::UInt => reader.u32(what)? as f64,
        DataType::Float => reader.f32(what)? as f64,
        DataType::Double => reader.f64(what)?,
        DataType::Unknown(code) => {
            return Err(LercError::decode(format!("cannot read samples of type code {}", code)))
        }
    })
}

fn as_decode(err: LercError) -> LercError {
    match err {
        LercError::Format(message) => LercError::Decode(message),
        other => other,
    }
}
