// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! Sits **outside** the domain/application/infrastructure layers and
//! provides the process entry point's own concerns:
//!
//! - **CLI** - `clap`-based parsing plus security validation (`cli`)
//! - **Signal handling** - graceful shutdown on SIGTERM/SIGINT/SIGHUP (`signals`)
//! - **Shutdown coordination** - cancellation tokens and grace period (`shutdown`)
//! - **Exit codes** - sysexits.h-style process exit mapping (`exit_code`)
//! - **Bootstrap logging** - a minimal logger usable before `tracing` is
//!   initialized (`logger`)
//!
//! `dubbing-orchestrator`'s `main.rs` is the composition root: it calls
//! into this crate to parse and validate arguments, then wires the domain
//! ports to their `infrastructure` adapters itself.

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Parses and validates CLI arguments. `clap` handles `--help`/`--version`
/// and malformed argument lists by exiting the process before returning.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
