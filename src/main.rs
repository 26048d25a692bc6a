mod cli;
mod config;
mod logging;
mod response;
mod synthetic;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Synthetic(args) => synthetic::run(args),
        Command::Response(args) => response::run(args),
    }
}
