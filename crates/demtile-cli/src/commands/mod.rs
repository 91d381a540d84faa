//! Subcommand implementations.
//!
//! Each input is processed independently on the rayon pool. Results are
//! printed in input order once all inputs are done.

pub mod downsample;
pub mod encode;
pub mod info;

use crate::CliError;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

/// Run `f` over every input in parallel, print the successes and log every
/// failure. Returns the first failure.
pub(crate) fn for_each_input<F>(inputs: &[PathBuf], f: F) -> Result<(), CliError>
where
    F: Fn(&Path) -> Result<String, CliError> + Sync,
{
    let results: Vec<Result<String, CliError>> = inputs.par_iter().map(|path| f(path)).collect();

    let mut first_failure = None;
    for result in results {
        match result {
            Ok(line) => println!("{}", line),
            Err(err) => {
                error!(code = err.exit_code(), "{}", err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::io(path, e))
}

/// `<out_dir or input dir>/<input stem><suffix>.png`
pub(crate) fn output_path(input: &Path, out_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}{}.png", stem, suffix))
}

pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| CliError::io(path, e))
}
