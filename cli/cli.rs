mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::*;
use log;
use std::process;

use cli_args::Cli;
use lightbundle_core::{AppError, BundleOutcome};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(&cli_args) {
        Ok(code) => code,
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Pattern { .. }) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(_) => 1,
                None => 1,
            };
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

/// Runs the pipeline and returns the process exit status: 0 when a bundle
/// was written, 1 when no file qualified.
fn run_app(cli: &Cli) -> Result<i32> {
    let outcome = commands::generate::handle_generate_command(cli)?;
    output::print_outcome(&outcome, cli.quiet);
    Ok(match outcome {
        BundleOutcome::NothingFound => 1,
        BundleOutcome::Written { .. } => 0,
    })
}
