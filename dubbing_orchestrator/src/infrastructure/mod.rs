// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Concrete adapters for the domain's ports: SQLite-backed repositories,
//! the in-process task broker, the filesystem artifact store, the stub
//! stage workers, process configuration, logging, and metrics.

pub mod artifact_store;
pub mod broker;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod repositories;
pub mod workers;

pub use artifact_store::ArtifactStore;
pub use broker::InProcessTaskBroker;
pub use config::Settings;
pub use metrics::MetricsService;
