// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dubbing Orchestrator Domain
//!
//! The domain layer of the job pipeline orchestrator: entities, value
//! objects, aggregates, domain events, and the repository/broker/worker
//! ports the application and infrastructure layers implement against.
//!
//! Following the same Domain-Driven Design split used throughout this
//! workspace:
//!
//! - **value_objects** — small, self-validating, identity-less types
//!   (`Stage`, `JobStatus`, `JobId`, `LanguageCode`, `RetryPolicy`, ...)
//! - **entities** — `Asset`, `Job`, `Segment`
//! - **aggregates** — `JobAggregate`, combining a `Job` with its
//!   not-yet-drained domain events
//! - **events** — `JobEvent` and its variants
//! - **repositories** — async trait ports: `JobRepository`,
//!   `AssetRepository`, the stage worker traits, `TaskBroker`
//! - **services** — pure, I/O-free domain logic (stage sequencing, the
//!   metric dedup cache)
//! - **error** — `OrchestratorError`, the one error type every domain
//!   operation returns
//!
//! This crate has no knowledge of SQLite, the broker's wire format, HTTP, or
//! any stage worker's actual implementation. Those live in
//! `dubbing-orchestrator`'s infrastructure layer.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::OrchestratorError;
