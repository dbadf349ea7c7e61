// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! ```text
//! 1. parser::parse_cli()       Parse CLI with clap
//! 2. validator::validate       Security validation
//! 3. ValidatedCli              Safe, validated config
//! ```

pub mod parser;
pub mod validator;

pub use parser::{Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: all paths canonicalized (when required to
/// exist) or argument-checked (when a future write target).
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Serve { queue: Option<String> },
    Worker { queue: Option<String> },
    Migrate,
}

/// Parses CLI arguments with `clap` and applies security validation.
///
/// # Errors
///
/// Returns [`ParseError`] if any argument fails validation. `clap` itself
/// handles `--help`/`--version` and malformed argument lists by exiting the
/// process before this function is reached.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parser::parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match cli.config {
        Some(path) => Some(SecureArgParser::validate_existing_path(&path.to_string_lossy())?),
        None => None,
    };

    let command = match cli.command {
        Commands::Serve { queue } => ValidatedCommand::Serve {
            queue: validate_queue(queue)?,
        },
        Commands::Worker { queue } => ValidatedCommand::Worker {
            queue: validate_queue(queue)?,
        },
        Commands::Migrate => ValidatedCommand::Migrate,
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
    })
}

fn validate_queue(queue: Option<String>) -> Result<Option<String>, ParseError> {
    match queue {
        Some(q) => {
            SecureArgParser::validate_argument(&q)?;
            Ok(Some(q))
        }
        None => Ok(None),
    }
}
