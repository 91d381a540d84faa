//! Command line arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Convert LERC elevation blobs to Terrain-RGB PNG tiles and downsample them.
#[derive(Debug, Parser)]
#[command(name = "demtile")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Elevation tile conversion and downsampling", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert LERC blobs to Mapbox Terrain-RGB PNGs.
    Encode(EncodeArgs),
    /// Downsample encoded PNG tiles.
    Downsample(DownsampleArgs),
    /// Print LERC blob metadata.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// LERC blobs to convert.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the PNG files (defaults to each input's directory).
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DownsampleArgs {
    /// Encoded PNG tiles.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output edge length in pixels (1 to 1024).
    #[arg(short, long)]
    pub size: u32,

    /// Pixel encoding of the inputs: mapbox or terrarium.
    #[arg(short, long, default_value = "mapbox")]
    pub encoding: String,

    /// Aggregation: average, nearest or maximum.
    #[arg(short, long, default_value = "average")]
    pub method: String,

    /// Directory for the PNG files (defaults to each input's directory).
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// LERC blobs to inspect.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print one JSON object per input.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// Newline delimited JSON.
    Json,
}
