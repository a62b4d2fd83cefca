use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Thien-Phuc Tu-Nguyen",
    version,
    about = "ptmc - grand-canonical Monte Carlo simulation of gas adsorption in rigid porous frameworks.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to run independent chains.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an adsorption simulation and export the particle-count series.
    Run(RunArgs),
    /// Print a summary of a framework structure and its force-field coverage.
    Inspect(InspectArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Inputs ---
    /// Path to the framework structure (CIF). Overrides `structure.path` from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Path to the force-field table (RASPA `.def` or TOML).
    /// Overrides `forcefield.path` from the config file.
    #[arg(short, long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Path to the simulation configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the particle-count series CSV. Overrides `output.series`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Condition Overrides ---
    /// Override the temperature in K.
    #[arg(long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Override the reservoir pressure in Pa.
    #[arg(long, value_name = "FLOAT")]
    pub pressure: Option<f64>,

    // --- Run Overrides ---
    /// Override the number of production steps.
    #[arg(long, value_name = "INT")]
    pub steps: Option<u64>,

    /// Override the random seed. Chain `i` uses `seed + i`.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of independent chains.
    #[arg(long, value_name = "INT")]
    pub chains: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S moves.max-displacement=2.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the framework structure (CIF).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Optional force-field table used to check type coverage.
    #[arg(short, long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,
}
