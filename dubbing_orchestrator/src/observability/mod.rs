// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Observability Plane: the per-job JSONL sink and the Prometheus
//! metrics service, both consumers of the events a [`JobAggregate`] drains.
//!
//! [`JobAggregate`]: dubbing_orchestrator_domain::aggregates::JobAggregate

pub mod stage_logger;

pub use stage_logger::StageLogger;
