use std::path::PathBuf;

use aquifer_rfunc::{DEFAULT_CUTOFF, ResponseFunction};
use clap::{Parser, Subcommand};

/// Aquifer groundwater head time-series modelling.
#[derive(Parser)]
#[command(
    name = "aquifer",
    version,
    about = "Groundwater head time-series modelling with response functions"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate a synthetic head record and calibrate a model on it.
    Synthetic(SyntheticArgs),
    /// Print the step and block response of a response function.
    Response(ResponseArgs),
}

/// Arguments for the `synthetic` subcommand.
#[derive(clap::Args)]
pub struct SyntheticArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "aquifer.toml")]
    pub config: PathBuf,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write the fit summary as JSON to this path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `response` subcommand.
#[derive(clap::Args)]
pub struct ResponseArgs {
    /// Response function (exponential, gamma, hantush, polder, four_param).
    #[arg(short, long)]
    pub kind: ResponseFunction,

    /// Comma-separated parameter values, gain first.
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub params: Vec<f64>,

    /// Time step, days.
    #[arg(long, default_value_t = 1.0)]
    pub dt: f64,

    /// Fraction of the gain at which the response is cut off.
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: f64,
}
