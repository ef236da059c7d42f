use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

use crate::cli_args::Cli;

pub fn handle_completion_command(shell: Shell) -> Result<()> {
    log::debug!("Generating {} completions", shell);
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    generate(shell, &mut command, bin_name, &mut handle);
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
