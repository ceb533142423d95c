//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "trial-compare",
    version,
    about = "Clinical trial results viewer - normalize posted results and compare trials",
    long_about = "Normalize posted clinical trial results and compare trials side by side.\n\n\
                  Reads trial records (native JSON or ClinicalTrials.gov v2 study documents)\n\
                  from a data directory, one <NCT_ID>.json file per trial."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding one <NCT_ID>.json file per trial.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "TRIAL_DATA_DIR",
        default_value = ".",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one trial's normalized results.
    Show(ShowArgs),

    /// Compare 2 to 5 trials.
    Compare(CompareArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Trial identifier, e.g. NCT01234567.
    #[arg(value_name = "NCT_ID")]
    pub nct_id: String,

    /// Print the normalized record as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Comma-separated trial identifiers, e.g. NCT01234567,NCT07654321.
    #[arg(value_name = "NCT_IDS")]
    pub ids: String,

    /// Print the comparison as JSON.
    #[arg(long = "json")]
    pub json: bool,

    /// Show at most this many common adverse events.
    #[arg(long = "max-highlights", value_name = "N")]
    pub max_highlights: Option<usize>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
