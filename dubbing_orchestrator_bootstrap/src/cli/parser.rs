// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line structure using `clap`. Security validation happens in
//! [`super::validator`] after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "dubbing-orchestrator")]
#[command(about = concat!("Dubbing job pipeline orchestrator v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML); falls back to defaults and
    /// environment variables when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the in-process broker loop plus the pipeline coordinator
    ///
    /// Intended for single-process deployments and local development: the
    /// Control API use cases and the task broker live in the same process.
    Serve {
        /// Broker queue to pull stage tasks from; overrides configuration
        #[arg(long)]
        queue: Option<String>,
    },

    /// Run only the pipeline coordinator worker loop against the broker
    ///
    /// Intended for horizontally scaled deployments: one or more worker
    /// processes drain the same queue; the Control API runs elsewhere.
    Worker {
        /// Broker queue to pull stage tasks from; overrides configuration
        #[arg(long)]
        queue: Option<String>,
    },

    /// Create or upgrade the SQLite schema, then exit
    Migrate,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
