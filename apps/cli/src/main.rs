//! releasewatch CLI — release tracker for saved catalog pages.
//!
//! Processes a directory of captured listing/chart pages into a daily
//! snapshot and a new-releases report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
