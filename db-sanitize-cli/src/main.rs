//! CLI entrypoint for `db-sanitize`: merge sanitize documents, then report or
//! generate declarations for the tables they miss.

mod cli;
mod commands;
mod error;
mod logging;

use std::io;

use clap::Parser;

use crate::cli::{Args, Command};
use crate::error::CliError;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    run().map_err(color_eyre::eyre::Report::from)
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();
    logging::init()?;

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    match args.command {
        Command::Merge(merge) => commands::merge(&merge, &mut stdout),
        Command::Analyze(analyze) => commands::analyze(&analyze, &mut stdout, &mut stderr),
        Command::Generate(generate) => commands::generate(&generate, &mut stdout, &mut stderr),
    }
}
