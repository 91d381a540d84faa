//! Elevation to RGB pixel encodings.
//!
//! ## Schemes
//!
//! | Scheme               | Encode                                            | Decode                              |
//! |----------------------|---------------------------------------------------|-------------------------------------|
//! | Mapbox Terrain-RGB   | `code = round((h + 10000) / 0.1)`, 24-bit BE      | `-10000 + code * 0.1`               |
//! | Terrarium            | `v = h + 32768`, `r,g = floor(v)`, `b = frac * 256` | `r * 256 + g + b / 256 - 32768`   |
//!
//! Mapbox codes saturate to `0..=16777215`. Terrarium keeps only the low 16
//! bits of the integer part, so elevations outside `-32768..32768` wrap, and
//! the low 8 bits of the rounded fraction.

use crate::TileError;
use std::fmt;
use std::str::FromStr;

/// Largest 24-bit Mapbox code.
const MAPBOX_MAX_CODE: f64 = 16_777_215.0;
const MAPBOX_OFFSET: f64 = 10_000.0;
const MAPBOX_STEP: f64 = 0.1;

const TERRARIUM_OFFSET: f32 = 32_768.0;

/// How elevations are packed into RGB pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncodingScheme {
    /// Mapbox Terrain-RGB, 0.1 m steps from -10000 m.
    #[cfg_attr(feature = "serde", serde(rename = "mapbox"))]
    MapboxTerrainRgb,
    /// Mapzen Terrarium, 1/256 m steps around 0 m.
    #[cfg_attr(feature = "serde", serde(rename = "terrarium"))]
    Terrarium,
}

impl EncodingScheme {
    /// Identifier used on the command line and in [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingScheme::MapboxTerrainRgb => "mapbox",
            EncodingScheme::Terrarium => "terrarium",
        }
    }

    /// Encode one elevation in meters.
    #[inline]
    pub fn encode(self, elevation: f32) -> [u8; 3] {
        match self {
            EncodingScheme::MapboxTerrainRgb => encode_mapbox(elevation),
            EncodingScheme::Terrarium => encode_terrarium(elevation),
        }
    }

    /// Decode one pixel to meters.
    #[inline]
    pub fn decode(self, pixel: [u8; 3]) -> f32 {
        match self {
            EncodingScheme::MapboxTerrainRgb => decode_mapbox(pixel),
            EncodingScheme::Terrarium => decode_terrarium(pixel),
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingScheme {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mapbox" => Ok(EncodingScheme::MapboxTerrainRgb),
            "terrarium" => Ok(EncodingScheme::Terrarium),
            other => Err(TileError::validation(format!(
                "unknown encoding scheme {:?} (expected \"mapbox\" or \"terrarium\")",
                other
            ))),
        }
    }
}

/// Encode an elevation in meters as an RGB pixel.
pub fn encode_terrain_pixel(elevation: f32, scheme: EncodingScheme) -> [u8; 3] {
    scheme.encode(elevation)
}

/// Decode an RGB pixel to an elevation in meters.
pub fn decode_terrain_pixel(r: u8, g: u8, b: u8, scheme: EncodingScheme) -> f32 {
    scheme.decode([r, g, b])
}

fn encode_mapbox(elevation: f32) -> [u8; 3] {
    let code = ((elevation as f64 + MAPBOX_OFFSET) / MAPBOX_STEP).round();
    // NaN survives clamp and casts to 0.
    let code = code.clamp(0.0, MAPBOX_MAX_CODE) as u32;
    [(code >> 16) as u8, (code >> 8) as u8, code as u8]
}

fn decode_mapbox([r, g, b]: [u8; 3]) -> f32 {
    let code = (r as u32) << 16 | (g as u32) << 8 | b as u32;
    (-MAPBOX_OFFSET + code as f64 * MAPBOX_STEP) as f32
}

fn encode_terrarium(elevation: f32) -> [u8; 3] {
    let value = elevation + TERRARIUM_OFFSET;
    let whole = value.floor();
    let fraction = value - whole;
    let whole = whole as i32;
    // Low byte only: a fraction rounding up to 256 stores 0 without carrying.
    let b = (fraction * 256.0).round() as i32 as u8;
    [(whole >> 8) as u8, whole as u8, b]
}

fn decode_terrarium([r, g, b]: [u8; 3]) -> f32 {
    (r as f32 * 256.0 + g as f32 + b as f32 / 256.0) - TERRARIUM_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mapbox_sea_level() {
        assert_eq!(encode_terrain_pixel(0.0, EncodingScheme::MapboxTerrainRgb), [1, 134, 160]);
        assert_abs_diff_eq!(
            decode_terrain_pixel(1, 134, 160, EncodingScheme::MapboxTerrainRgb),
            0.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_mapbox_saturates() {
        let scheme = EncodingScheme::MapboxTerrainRgb;
        assert_eq!(scheme.encode(-10_000.0), [0, 0, 0]);
        assert_eq!(scheme.encode(-20_000.0), [0, 0, 0]);
        assert_eq!(scheme.encode(1.0e7), [255, 255, 255]);
        assert_eq!(scheme.encode(f32::NAN), [0, 0, 0]);
    }

    #[test]
    fn test_mapbox_decode_encode_is_stable() {
        let scheme = EncodingScheme::MapboxTerrainRgb;
        for pixel in [[0, 0, 0], [1, 134, 160], [1, 200, 7], [3, 17, 255]] {
            assert_eq!(scheme.encode(scheme.decode(pixel)), pixel);
        }
    }

    #[test]
    fn test_terrarium_values() {
        let scheme = EncodingScheme::Terrarium;
        assert_eq!(scheme.encode(0.0), [128, 0, 0]);
        assert_eq!(scheme.encode(1.5), [128, 1, 128]);
        assert_eq!(scheme.encode(-0.25), [127, 255, 192]);
        assert_eq!(scheme.decode([128, 1, 128]), 1.5);
        assert_eq!(decode_terrain_pixel(128, 0, 0, scheme), 0.0);
    }

    #[test]
    fn test_terrarium_fraction_keeps_low_byte() {
        // -0.001 + 32768 is 32767.998046875 in f32; 0.998046875 * 256 rounds to 256.
        assert_eq!(EncodingScheme::Terrarium.encode(-0.001), [127, 255, 0]);
        assert_eq!(EncodingScheme::Terrarium.encode(-0.004), [127, 255, 255]);
    }

    #[test]
    fn test_terrarium_wraps_out_of_range() {
        // 40000 + 32768 = 0x11C40, only the low 16 bits are kept.
        assert_eq!(EncodingScheme::Terrarium.encode(40_000.0), [0x1C, 0x40, 0]);
    }

    #[test]
    fn test_mapbox_round_trip_sweep() {
        let scheme = EncodingScheme::MapboxTerrainRgb;
        // -10000 to 9000 in steps of 0.37 m.
        for k in 0..=51_351 {
            let elevation = (-10_000.0 + k as f64 * 0.37) as f32;
            let decoded = scheme.decode(scheme.encode(elevation));
            assert_abs_diff_eq!(decoded, elevation, epsilon = 0.051);
        }
    }

    #[test]
    fn test_terrarium_round_trip_sweep() {
        let scheme = EncodingScheme::Terrarium;
        // Fractions stay on multiples of 1/8, below the byte carry.
        for k in 0..47_662 {
            let elevation = -32_768.0 + k as f32 * 1.375;
            let decoded = scheme.decode(scheme.encode(elevation));
            assert_abs_diff_eq!(decoded, elevation, epsilon = 1.0 / 256.0);
        }
        // Off-grid fractions below 255.5 / 256 round to the nearest step.
        for k in 0..20_000 {
            let elevation = -5_000.0 + k as f32 * 0.613;
            if (elevation + 32_768.0).fract() >= 255.5 / 256.0 {
                continue;
            }
            let decoded = scheme.decode(scheme.encode(elevation));
            assert_abs_diff_eq!(decoded, elevation, epsilon = 1.0 / 256.0);
        }
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("mapbox".parse::<EncodingScheme>().unwrap(), EncodingScheme::MapboxTerrainRgb);
        assert_eq!("terrarium".parse::<EncodingScheme>().unwrap(), EncodingScheme::Terrarium);
        assert!(matches!("Mapbox".parse::<EncodingScheme>(), Err(TileError::Validation(_))));
        assert_eq!(EncodingScheme::Terrarium.to_string(), "terrarium");
    }
}
