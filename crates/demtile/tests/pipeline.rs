//! End-to-end tests for the tile pipeline using generated LERC blobs.

use approx::assert_abs_diff_eq;
use demtile::{
    decode_png, decode_terrain_container, downsample_raster, elevation_to_terrain_container,
    encode_png, EncodingScheme, LercError, RgbRaster, TileError,
};
use demtile_lerc::{BlobWriter, DataType};

/// A gentle synthetic terrain surface.
fn terrain(cols: i32, rows: i32) -> Vec<f32> {
    (0..rows)
        .flat_map(|y| (0..cols).map(move |x| 120.0 + x as f32 * 0.8 - y as f32 * 0.35))
        .collect()
}

#[test]
fn test_bordered_tile_is_cropped_to_256() {
    let values = terrain(257, 257);
    let blob = BlobWriter::new(257, 257, values.clone()).version(4).max_z_error(0.01).write();

    let png = elevation_to_terrain_container(&blob).unwrap().unwrap();
    let raster = decode_png(&png).unwrap();
    assert_eq!((raster.width(), raster.height()), (256, 256));

    let scheme = EncodingScheme::MapboxTerrainRgb;
    for (x, y) in [(0u32, 0u32), (255, 0), (17, 200), (255, 255)] {
        let expected = values[(y * 257 + x) as usize];
        let decoded = scheme.decode(raster.pixel(x, y));
        // Quantization error plus half a Mapbox step.
        assert_abs_diff_eq!(decoded, expected, epsilon = 0.061);
    }
}

#[test]
fn test_lossless_tile_matches_direct_encoding() {
    let values = terrain(40, 30);
    let blob = BlobWriter::new(40, 30, values.clone()).one_sweep().write();

    let png = elevation_to_terrain_container(&blob).unwrap().unwrap();
    let raster = decode_png(&png).unwrap();
    assert_eq!((raster.width(), raster.height()), (40, 30));

    let expected: Vec<u8> = values
        .iter()
        .flat_map(|&z| EncodingScheme::MapboxTerrainRgb.encode(z))
        .collect();
    assert_eq!(raster.as_bytes(), expected.as_slice());
}

#[test]
fn test_only_first_band_is_encoded() {
    let first = terrain(8, 8);
    let second: Vec<f32> = first.iter().map(|z| z + 1000.0).collect();
    let blob = [
        BlobWriter::new(8, 8, first.clone()).one_sweep().write(),
        BlobWriter::new(8, 8, second).one_sweep().write(),
    ]
    .concat();

    let png = elevation_to_terrain_container(&blob).unwrap().unwrap();
    let grid = decode_terrain_container(&png, EncodingScheme::MapboxTerrainRgb).unwrap();
    assert_eq!(grid.bands(), 1);
    assert_abs_diff_eq!(grid.get(3, 5).unwrap(), first[5 * 8 + 3], epsilon = 0.051);
}

#[test]
fn test_no_data_tile_yields_none() {
    let blob = BlobWriter::new(16, 16, vec![0.0; 256]).mask(vec![false; 256]).write();
    assert_eq!(elevation_to_terrain_container(&blob).unwrap(), None);
}

#[test]
fn test_lerc_errors_pass_through() {
    let err = elevation_to_terrain_container(&[]).unwrap_err();
    assert!(matches!(err, TileError::Lerc(LercError::Format(_))));

    let blob = BlobWriter::new(4, 4, vec![1.0; 16]).data_type(DataType::Double).write();
    let err = elevation_to_terrain_container(&blob).unwrap_err();
    assert!(matches!(err, TileError::Lerc(LercError::UnsupportedType(DataType::Double))));
}

#[test]
fn test_downsample_target_2000_is_rejected() {
    let png = encode_png(&RgbRaster::new(4, 4, vec![0; 48]).unwrap()).unwrap();
    let err = downsample_raster(&png, 2000, "mapbox", "average").unwrap_err();
    assert!(matches!(err, TileError::Validation(_)));
}

#[test]
fn test_downsample_unknown_scheme_is_rejected() {
    let png = encode_png(&RgbRaster::new(4, 4, vec![0; 48]).unwrap()).unwrap();
    let err = downsample_raster(&png, 2, "geotiff", "average").unwrap_err();
    assert!(matches!(err, TileError::Validation(_)));
}

#[test]
fn test_downsample_noop_returns_input_bytes() {
    let png = encode_png(&RgbRaster::new(4, 4, vec![9; 48]).unwrap()).unwrap();
    let out = downsample_raster(&png, 256, "terrarium", "maximum").unwrap();
    assert_eq!(out, png);
}

#[test]
fn test_downsample_lerc_tile_to_128() {
    let values = terrain(257, 257);
    let blob = BlobWriter::new(257, 257, values).max_z_error(0.01).write();
    let png = elevation_to_terrain_container(&blob).unwrap().unwrap();

    for method in ["average", "nearest", "maximum"] {
        let out = downsample_raster(&png, 128, "mapbox", method).unwrap();
        let raster = decode_png(&out).unwrap();
        assert_eq!((raster.width(), raster.height()), (128, 128));
    }

    let source = decode_png(&png).unwrap();
    let nearest = decode_png(&downsample_raster(&png, 128, "mapbox", "nearest").unwrap()).unwrap();
    assert_eq!(nearest.pixel(10, 20), source.pixel(20, 40));
}

#[test]
fn test_terrarium_container_round_trip() {
    let scheme = EncodingScheme::Terrarium;
    let data: Vec<u8> = [-12.5f32, 0.0, 431.25, 8848.0]
        .iter()
        .flat_map(|&z| scheme.encode(z))
        .collect();
    let png = encode_png(&RgbRaster::new(2, 2, data).unwrap()).unwrap();

    let grid = decode_terrain_container(&png, scheme).unwrap();
    assert_eq!(grid.values(), &[-12.5, 0.0, 431.25, 8848.0]);
}
