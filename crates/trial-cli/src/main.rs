//! Clinical trial results CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use trial_cli::commands::{EXIT_FAILURE, exit_code, run_compare, run_show};
use trial_cli::logging::{LogConfig, LogFormat, init_logging};
use trial_cli::summary::{render_comparison, render_trial, render_warnings};
use trial_compare::CompareOptions;
use trial_ingest::DirectorySource;

mod cli;

use crate::cli::{Cli, Command, CompareArgs, LogFormatArg, LogLevelArg, ShowArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    let result = match &cli.command {
        Command::Show(args) => show(&cli, args),
        Command::Compare(args) => compare(&cli, args),
    };
    let code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            exit_code(&error)
        }
    };
    std::process::exit(code);
}

fn show(cli: &Cli, args: &ShowArgs) -> anyhow::Result<()> {
    let source = DirectorySource::new(&cli.data_dir)?;
    let result = run_show(&source, &args.nct_id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.trial)?);
    } else {
        print!("{}", render_trial(&result.trial));
    }
    if let Some(warnings) = render_warnings(&result.warnings) {
        eprintln!("{warnings}");
    }
    Ok(())
}

fn compare(cli: &Cli, args: &CompareArgs) -> anyhow::Result<()> {
    let source = DirectorySource::new(&cli.data_dir)?;
    let options = CompareOptions {
        max_safety_highlights: args.max_highlights,
        ..CompareOptions::default()
    };
    let result = run_compare(&source, &args.ids, &options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.comparison)?);
    } else {
        print!("{}", render_comparison(&result.comparison));
    }
    if let Some(warnings) = render_warnings(&result.warnings) {
        eprintln!("{warnings}");
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
