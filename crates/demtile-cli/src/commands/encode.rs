//! `demtile encode`: LERC blobs to Terrain-RGB PNGs.

use super::{for_each_input, output_path, read_input, write_output};
use crate::cli::EncodeArgs;
use crate::CliError;
use demtile::elevation_to_terrain_container;
use std::path::Path;
use tracing::{info, warn};

pub fn execute(args: &EncodeArgs) -> Result<(), CliError> {
    let out_dir = args.out_dir.as_deref();
    for_each_input(&args.inputs, |path| encode_one(path, out_dir))
}

fn encode_one(path: &Path, out_dir: Option<&Path>) -> Result<String, CliError> {
    let blob = read_input(path)?;
    let png = match elevation_to_terrain_container(&blob).map_err(|e| CliError::tile(path, e))? {
        Some(png) => png,
        None => {
            warn!(path = %path.display(), "no valid pixels, skipped");
            return Ok(format!("{}: no data, skipped", path.display()));
        }
    };

    let out = output_path(path, out_dir, "");
    write_output(&out, &png)?;
    info!(input = %path.display(), output = %out.display(), bytes = png.len(), "encoded tile");
    Ok(format!("{} -> {}", path.display(), out.display()))
}
