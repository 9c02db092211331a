//! mdtidy Binary Entry Point

use anyhow::Result;
use clap::Parser;
use mdtidy_cli::Cli;

fn main() -> Result<()> {
    mdtidy_cli::run(Cli::parse())
}
