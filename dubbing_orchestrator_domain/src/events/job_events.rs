// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Domain Events
//!
//! Lifecycle events emitted by [`JobAggregate`] as it drives a job through
//! its stages. These are the in-process analogue of the structured log
//! events the Observability Plane emits: it subscribes to them
//! (by draining `JobAggregate::take_uncommitted_events`) to emit JSONL log
//! lines and update Prometheus collectors, so that stage-outcome logic is
//! written once, on the aggregate, rather than duplicated at every call
//! site that happens to touch a job.
//!
//! [`JobAggregate`]: crate::aggregates::job_aggregate::JobAggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AssetId, JobId, Stage, StageOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCreatedEvent {
    pub job_id: JobId,
    pub asset_id: AssetId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransitionEvent {
    pub job_id: JobId,
    pub asset_id: AssetId,
    pub stage: Stage,
    pub outcome: StageOutcome,
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTerminatedEvent {
    pub job_id: JobId,
    pub asset_id: AssetId,
    pub status: crate::value_objects::JobStatus,
    pub failed_stage: Option<Stage>,
    pub occurred_at: DateTime<Utc>,
}

/// One domain event raised by a [`JobAggregate`] mutation.
///
/// [`JobAggregate`]: crate::aggregates::job_aggregate::JobAggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JobEvent {
    Created(JobCreatedEvent),
    StageTransitioned(StageTransitionEvent),
    Terminated(JobTerminatedEvent),
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Created(e) => e.job_id,
            JobEvent::StageTransitioned(e) => e.job_id,
            JobEvent::Terminated(e) => e.job_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            JobEvent::Created(e) => e.occurred_at,
            JobEvent::StageTransitioned(e) => e.occurred_at,
            JobEvent::Terminated(e) => e.occurred_at,
        }
    }
}
