//! End-to-end tests running the `demtile` binary on temporary files.

use demtile_lerc::BlobWriter;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn demtile(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_demtile"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run demtile")
}

fn write_blob(dir: &Path, name: &str, cols: i32, rows: i32) -> String {
    let values = (0..cols * rows).map(|k| 50.0 + (k % cols) as f32 * 0.5).collect();
    let path = dir.join(name);
    fs::write(&path, BlobWriter::new(cols, rows, values).version(4).write()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_encode_then_downsample() {
    let dir = tempdir().unwrap();
    let blob = write_blob(dir.path(), "tile.lerc", 257, 257);
    let out_dir = dir.path().join("out");
    let out_dir_arg = out_dir.to_string_lossy().into_owned();

    let output = demtile(&["encode", &blob, "--out-dir", &out_dir_arg]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let png_path = out_dir.join("tile.png");
    let raster = demtile::decode_png(&fs::read(&png_path).unwrap()).unwrap();
    assert_eq!((raster.width(), raster.height()), (256, 256));

    let png_arg = png_path.to_string_lossy().into_owned();
    let output = demtile(&["downsample", &png_arg, "--size", "64", "--method", "nearest"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let small = demtile::decode_png(&fs::read(out_dir.join("tile_64.png")).unwrap()).unwrap();
    assert_eq!((small.width(), small.height()), (64, 64));
    assert_eq!(small.pixel(3, 0), raster.pixel(12, 0));
}

#[test]
fn test_encode_skips_no_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.lerc");
    fs::write(&path, BlobWriter::new(4, 4, vec![0.0; 16]).mask(vec![false; 16]).write()).unwrap();

    let path_arg = path.to_string_lossy().into_owned();

    let output = demtile(&["encode", &path_arg]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("no data"));
    assert!(!dir.path().join("empty.png").exists());
}

#[test]
fn test_info_json() {
    let dir = tempdir().unwrap();
    let blob = write_blob(dir.path(), "a.lerc", 10, 6);

    let output = demtile(&["info", &blob, "--json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["cols"], 10);
    assert_eq!(report["rows"], 6);
    assert_eq!(report["bands"], 1);
    assert_eq!(report["version"], 4);
    assert_eq!(report["path"], blob.as_str());
}

#[test]
fn test_exit_codes() {
    let dir = tempdir().unwrap();
    let blob = write_blob(dir.path(), "a.lerc", 8, 8);
    let garbage = dir.path().join("garbage.lerc");
    fs::write(&garbage, b"not a lerc blob").unwrap();
    let garbage = garbage.to_string_lossy().into_owned();
    let missing = dir.path().join("missing.lerc").to_string_lossy().into_owned();

    let output = demtile(&["downsample", &blob, "--size", "2000"]);
    assert_eq!(output.status.code(), Some(2));

    let output = demtile(&["downsample", &blob, "--size", "4", "--encoding", "geotiff"]);
    assert_eq!(output.status.code(), Some(2));

    let output = demtile(&["encode", &garbage]);
    assert_eq!(output.status.code(), Some(3));

    // Not a PNG.
    let output = demtile(&["downsample", &blob, "--size", "4"]);
    assert_eq!(output.status.code(), Some(4));

    let output = demtile(&["info", &missing]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_multiple_inputs_report_first_failure() {
    let dir = tempdir().unwrap();
    let good = write_blob(dir.path(), "good.lerc", 8, 8);
    let missing = dir.path().join("missing.lerc").to_string_lossy().into_owned();

    let output = demtile(&["encode", &missing, &good]);
    assert_eq!(output.status.code(), Some(5));
    assert!(dir.path().join("good.png").exists());
}
