//! `demtile downsample`: shrink encoded PNG tiles.

use super::{for_each_input, output_path, read_input, write_output};
use crate::cli::DownsampleArgs;
use crate::CliError;
use demtile::{downsample_raster, validate_target_size};
use std::path::Path;
use tracing::info;

pub fn execute(args: &DownsampleArgs) -> Result<(), CliError> {
    let suffix = format!("_{}", args.size);
    for_each_input(&args.inputs, |path| downsample_one(path, args, &suffix))
}

fn downsample_one(path: &Path, args: &DownsampleArgs, suffix: &str) -> Result<String, CliError> {
    // Parameters are rejected before the input is read.
    validate_target_size(args.size).map_err(|e| CliError::tile(path, e))?;

    let png = read_input(path)?;
    let out_png = downsample_raster(&png, args.size, &args.encoding, &args.method)
        .map_err(|e| CliError::tile(path, e))?;

    let out = output_path(path, args.out_dir.as_deref(), suffix);
    write_output(&out, &out_png)?;
    info!(
        input = %path.display(),
        output = %out.display(),
        size = args.size,
        method = %args.method,
        "downsampled tile"
    );
    Ok(format!("{} -> {}", path.display(), out.display()))
}
