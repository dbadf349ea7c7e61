// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Logging
//!
//! Initializes the process-wide `tracing` subscriber: JSON output in
//! non-dev environments, human-readable in `dev`, both honoring
//! `RUST_LOG`. This is the operator-facing log; the per-job JSONL sink
//! lives in [`crate::observability::stage_logger`] and is a distinct
//! concern with its own audience and lifetime.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber. Must be called exactly once,
/// as early as possible in `main`.
pub fn init_tracing(environment: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if environment == "dev" {
        fmt().with_env_filter(filter).with_target(true).init();
    } else {
        fmt().with_env_filter(filter).json().with_target(true).init();
    }
}
