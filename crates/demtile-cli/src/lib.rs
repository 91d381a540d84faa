//! # demtile-cli
//!
//! Library half of the `demtile` binary: argument definitions, logging setup
//! and the subcommands. Kept separate from `main.rs` so the commands can be
//! driven from tests.

pub mod cli;
pub mod commands;
mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use error::CliError;

/// Run the parsed command.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Encode(args) => commands::encode::execute(args),
        Command::Downsample(args) => commands::downsample::execute(args),
        Command::Info(args) => commands::info::execute(args),
    }
}
