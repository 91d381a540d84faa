//! `demtile info`: print LERC blob metadata.

use super::{for_each_input, read_input};
use crate::cli::InfoArgs;
use crate::CliError;
use demtile::{blob_info, BlobInfo};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    path: &'a str,
    #[serde(flatten)]
    info: &'a BlobInfo,
}

pub fn execute(args: &InfoArgs) -> Result<(), CliError> {
    for_each_input(&args.inputs, |path| info_one(path, args.json))
}

fn info_one(path: &Path, json: bool) -> Result<String, CliError> {
    let blob = read_input(path)?;
    let info = blob_info(&blob).map_err(|e| CliError::tile(path, e))?;

    if json {
        let path = path.to_string_lossy();
        let report = InfoReport {
            path: &*path,
            info: &info,
        };
        return Ok(serde_json::to_string(&report)?);
    }
    Ok(format_text(path, &info))
}

fn format_text(path: &Path, info: &BlobInfo) -> String {
    format!(
        "{}: Lerc2 v{}, {}x{} x{} band(s), depth {}, {}, {} valid pixels, z {}..{}, max error {}, {} bytes",
        path.display(),
        info.version,
        info.cols,
        info.rows,
        info.bands,
        info.depth,
        info.data_type,
        info.valid_pixels,
        info.z_min,
        info.z_max,
        info.max_z_error,
        info.blob_size
    )
}
