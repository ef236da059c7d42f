mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::process;

use cli_args::Cli;
use gptrepo_core::AppError;

/// Exit status for a missing repository path.
const USAGE_EXIT_CODE: i32 = 1;

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose, cli_args.debug);

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(&cli_args) {
        Ok(()) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = e
                .downcast_ref::<AppError>()
                .map_or(1, AppError::exit_code);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: bool, debug: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match (verbose, debug) {
            (_, 1) => log::LevelFilter::Debug,
            (_, 2..) => log::LevelFilter::Trace,
            (true, _) => log::LevelFilter::Info,
            (false, _) => log::LevelFilter::Warn,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: &Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        return commands::completion::handle_completion_command(shell);
    }

    let Some(repo_path) = cli.repo_path.as_deref() else {
        eprintln!("{}", Cli::command().render_help());
        process::exit(USAGE_EXIT_CODE);
    };

    log::debug!("Executing generate for {}", repo_path.display());
    commands::generate::handle_generate_command(cli, repo_path, cli.quiet)
}
