//! Vigil CLI: argument parsing and command implementations for the `vigil` binary.

pub mod cli;
pub mod commands;
pub mod error;

use std::io::Read;

use cli::{Cli, Commands};
use commands::validate::ValidateArgs;
use commands::CommandOutput;
use error::CliError;

/// Run a parsed command. `stdin` feeds `validate` when no file is given.
pub fn run(cli: Cli, stdin: &mut dyn Read) -> Result<CommandOutput, CliError> {
    match cli.command {
        Commands::Validate {
            files,
            role,
            name,
            format,
            no_color,
            min_score,
            config,
        } => commands::validate::run(
            ValidateArgs {
                files,
                role,
                name,
                format,
                no_color,
                min_score,
                config,
            },
            stdin,
        ),
        Commands::Rules { role, config } => commands::rules::run(role.as_deref(), &config),
    }
}
