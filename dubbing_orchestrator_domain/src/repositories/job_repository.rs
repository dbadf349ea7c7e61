// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Repository Port
//!
//! Durable state for jobs. This trait is the domain-facing
//! contract; `dubbing-orchestrator`'s infrastructure layer supplies a
//! `sqlx`-backed SQLite implementation. Every method here corresponds
//! directly to one of the Job Store operations in the specification — none
//! of them embed SQL or connection-pool details, keeping the coordinator and
//! stage runner testable against any implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::entities::Job;
use crate::error::OrchestratorError;
use crate::value_objects::{JobId, JobStatus, RequesterId, Stage, StageOutcome};

/// A page of jobs plus the total row count, for `list`'s pagination
/// envelope.
#[derive(Debug, Clone)]
pub struct JobPage {
    pub items: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persists a newly created job and returns it with its `row_id`
    /// assigned.
    async fn create(&self, job: Job) -> Result<Job, OrchestratorError>;

    async fn get_by_external_id(&self, id: JobId) -> Result<Option<Job>, OrchestratorError>;

    /// Lists jobs ordered by `created_at` descending, `page` 1-based.
    async fn list(&self, page: u32, page_size: u32) -> Result<JobPage, OrchestratorError>;

    /// Counts jobs grouped by status, for the `jobs_total{status}` gauge.
    async fn count_by_status(&self) -> Result<HashMap<JobStatus, u64>, OrchestratorError>;

    /// Counts RUNNING jobs grouped by current stage, for the
    /// `jobs_stage_active{stage}` gauge.
    async fn count_running_by_stage(&self) -> Result<HashMap<Stage, u64>, OrchestratorError>;

    /// The most recently created `limit` jobs, for `/metrics`' 200-job
    /// sampling window.
    async fn fetch_recent(&self, limit: u32) -> Result<Vec<Job>, OrchestratorError>;

    /// Persists a stage/status/progress transition.
    async fn update_stage(
        &self,
        job_id: JobId,
        stage: Stage,
        status: JobStatus,
        progress: f64,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OrchestratorError>;

    /// Overwrites the `stage_history` slot for `stage`.
    async fn record_stage_history(
        &self,
        job_id: JobId,
        stage: Stage,
        outcome: StageOutcome,
        details: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<(), OrchestratorError>;

    async fn update_logs_key(&self, job_id: JobId, key: Option<String>, now: DateTime<Utc>) -> Result<(), OrchestratorError>;

    /// Resets a job for a new attempt at `resume_stage`.
    async fn reset_for_retry(&self, job_id: JobId, resume_stage: Stage, now: DateTime<Utc>) -> Result<(), OrchestratorError>;

    /// Cancels a job.
    async fn cancel(&self, job_id: JobId, now: DateTime<Utc>) -> Result<(), OrchestratorError>;

    /// Counts PENDING+RUNNING jobs owned by `client_id`, for quota
    /// enforcement.
    async fn count_active_for_requester(&self, client_id: &RequesterId) -> Result<u64, OrchestratorError>;
}
