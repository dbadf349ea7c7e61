// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Dubbing Orchestrator
//!
//! A job-pipeline orchestrator that carries an uploaded media asset through
//! speech recognition, translation, synthesis, mixing, and packaging, one
//! target language at a time.
//!
//! ## Architecture Overview
//!
//! The crate follows the same Clean Architecture / Domain-Driven Design
//! layering as its sibling crates:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                           │
//! │  (Control API use cases, Pipeline Coordinator)                │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                           │
//! │  (SQLite repositories, task broker, artifact store, workers)  │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │         dubbing-orchestrator-domain (ports, entities)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `dubbing-orchestrator-domain` defines the ports (repositories, stage
//! workers, task broker) and the entities and value objects that flow
//! through them. This crate supplies the concrete adapters and the two
//! pieces of business process sitting above the domain: the Control API
//! use cases (create/list/get/cancel/retry a job) and the Pipeline
//! Coordinator, which advances a job through its stages by handling task
//! messages pulled from the broker.
//!
//! There is no HTTP layer here. The `dubbing-orchestrator` binary, wired
//! up in `main.rs` with `dubbing-orchestrator-bootstrap`, drives the
//! coordinator directly against the in-process broker; a REST front end
//! would be a separate crate built on these same use cases.
//!
//! ## Stages
//!
//! A job moves through ASR, Translate, TTS, Mix, and Package, the last
//! four resolved once per target language, before reaching `Done`. See
//! [`dubbing_orchestrator_domain::value_objects::Stage`] for the exact
//! ordering and terminal states.
//!
//! ## Observability
//!
//! Two independent mechanisms serve two different audiences:
//! - [`observability::StageLogger`] appends a JSONL record per stage
//!   transition to a per-job log file, for an operator debugging one job.
//! - [`infrastructure::MetricsService`] exposes Prometheus counters and
//!   histograms across all jobs, for dashboards and alerting.

pub mod application;
pub mod infrastructure;
pub mod observability;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use dubbing_orchestrator_domain::error::OrchestratorError;
pub use dubbing_orchestrator_domain::value_objects::Stage;

pub use crate::application::coordinator::PipelineCoordinator;
pub use crate::infrastructure::{ArtifactStore, InProcessTaskBroker, MetricsService, Settings};
