// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics Service Implementation
//!
//! Prometheus-based metrics collection for the job pipeline: gauges for
//! running jobs by status and by stage, control-plane (`api_`-prefixed) and
//! worker-side (`job_`-prefixed) histograms/counters for per-stage latency
//! and failures, and a worker-side in-progress gauge. The two prefixes
//! track the same stage-execution events from the control plane's and the
//! worker's point of view; this binary plays both roles, so both series
//! are updated together rather than wired to two separate processes.
//! Observations are gated through the process-wide [`DedupCache`] so a
//! re-delivered task never double-counts a stage-history write.

use parking_lot::Mutex;
use prometheus::{HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, HistogramOpts, Opts, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::services::DedupCache;
use dubbing_orchestrator_domain::value_objects::{JobId, JobStatus, Stage};

/// Histogram buckets (seconds) for per-stage duration.
const STAGE_DURATION_BUCKETS: &[f64] = &[1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0];

/// Prometheus metrics service for the job pipeline.
///
/// Thread-safe and cheap to clone (every field is reference-counted). The
/// dedup cache is process-wide: constructing more than one `MetricsService`
/// in the same process is a bug, which is why bootstrap builds exactly one
/// and shares it via `Arc`.
#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<Registry>,
    jobs_total: IntGaugeVec,
    jobs_running: IntGauge,
    jobs_stage_active: IntGaugeVec,
    api_stage_duration_seconds: HistogramVec,
    api_stage_failures_total: IntCounterVec,
    job_stage_in_progress: IntGaugeVec,
    job_stage_failures_total: IntCounterVec,
    job_stage_duration_seconds: HistogramVec,
    dedup: Arc<Mutex<DedupCache>>,
}

impl MetricsService {
    pub fn new() -> Result<Self, OrchestratorError> {
        let registry = Registry::new();

        let jobs_total = IntGaugeVec::new(
            Opts::new("jobs_total", "Number of jobs currently in each status").namespace("dubbing_orchestrator"),
            &["status"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create jobs_total metric: {e}")))?;

        let jobs_running = IntGauge::with_opts(
            Opts::new("jobs_running", "Number of jobs currently in the RUNNING status").namespace("dubbing_orchestrator"),
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create jobs_running metric: {e}")))?;

        let jobs_stage_active = IntGaugeVec::new(
            Opts::new("jobs_stage_active", "Number of RUNNING jobs currently at each stage")
                .namespace("dubbing_orchestrator"),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create jobs_stage_active metric: {e}")))?;

        let api_stage_duration_seconds = HistogramVec::new(
            HistogramOpts::new("api_stage_duration_seconds", "Control-plane view of time spent executing a single stage attempt")
                .namespace("dubbing_orchestrator")
                .buckets(STAGE_DURATION_BUCKETS.to_vec()),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create api_stage_duration_seconds metric: {e}")))?;

        let api_stage_failures_total = IntCounterVec::new(
            Opts::new("api_stage_failures_total", "Control-plane view of total stage execution failures by stage")
                .namespace("dubbing_orchestrator"),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create api_stage_failures_total metric: {e}")))?;

        let job_stage_in_progress = IntGaugeVec::new(
            Opts::new("job_stage_in_progress", "Number of stage attempts a worker currently has in flight, by stage")
                .namespace("dubbing_orchestrator"),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create job_stage_in_progress metric: {e}")))?;

        let job_stage_failures_total = IntCounterVec::new(
            Opts::new("job_stage_failures_total", "Worker-side view of total stage execution failures by stage")
                .namespace("dubbing_orchestrator"),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create job_stage_failures_total metric: {e}")))?;

        let job_stage_duration_seconds = HistogramVec::new(
            HistogramOpts::new("job_stage_duration_seconds", "Worker-side view of time spent executing a single stage attempt")
                .namespace("dubbing_orchestrator")
                .buckets(STAGE_DURATION_BUCKETS.to_vec()),
            &["stage"],
        )
        .map_err(|e| OrchestratorError::metrics_error(format!("failed to create job_stage_duration_seconds metric: {e}")))?;

        registry
            .register(Box::new(jobs_total.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register jobs_total: {e}")))?;
        registry
            .register(Box::new(jobs_running.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register jobs_running: {e}")))?;
        registry
            .register(Box::new(jobs_stage_active.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register jobs_stage_active: {e}")))?;
        registry
            .register(Box::new(api_stage_duration_seconds.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register api_stage_duration_seconds: {e}")))?;
        registry
            .register(Box::new(api_stage_failures_total.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register api_stage_failures_total: {e}")))?;
        registry
            .register(Box::new(job_stage_in_progress.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register job_stage_in_progress: {e}")))?;
        registry
            .register(Box::new(job_stage_failures_total.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register job_stage_failures_total: {e}")))?;
        registry
            .register(Box::new(job_stage_duration_seconds.clone()))
            .map_err(|e| OrchestratorError::metrics_error(format!("failed to register job_stage_duration_seconds: {e}")))?;

        debug!("MetricsService initialized with Prometheus registry");

        Ok(Self {
            registry: Arc::new(registry),
            jobs_total,
            jobs_running,
            jobs_stage_active,
            api_stage_duration_seconds,
            api_stage_failures_total,
            job_stage_in_progress,
            job_stage_failures_total,
            job_stage_duration_seconds,
            dedup: Arc::new(Mutex::new(DedupCache::default())),
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Resets the `jobs_total{status}` gauge set (and the derived
    /// `jobs_running` gauge) to the counts currently read from the job
    /// store. Called on a timer rather than incrementally adjusted, since a
    /// job's status count is cheap to recompute and hard to adjust
    /// correctly from scattered call sites.
    pub fn set_jobs_by_status(&self, counts: &HashMap<JobStatus, u64>) {
        for status in JobStatus::ALL {
            let count = counts.get(&status).copied().unwrap_or(0);
            self.jobs_total.with_label_values(&[&status.to_string()]).set(count as i64);
        }
        self.jobs_running.set(counts.get(&JobStatus::Running).copied().unwrap_or(0) as i64);
    }

    pub fn set_jobs_by_stage(&self, counts: &HashMap<Stage, u64>) {
        for stage in Stage::RUNNABLE {
            let count = counts.get(&stage).copied().unwrap_or(0);
            self.jobs_stage_active.with_label_values(&[&stage.to_string()]).set(count as i64);
        }
    }

    /// Marks a stage attempt as started for `job_stage_in_progress{stage}`.
    /// Pair with [`Self::mark_stage_finished`] once the attempt completes,
    /// successfully or not.
    pub fn mark_stage_started(&self, stage: Stage) {
        self.job_stage_in_progress.with_label_values(&[&stage.to_string()]).inc();
    }

    pub fn mark_stage_finished(&self, stage: Stage) {
        self.job_stage_in_progress.with_label_values(&[&stage.to_string()]).dec();
    }

    /// Records a stage duration observation on both the control-plane and
    /// worker-side histograms, gated by the dedup cache on
    /// `(job_id, stage, updated_at)`. Returns `false` if this event was
    /// already observed (a redelivered task), in which case no observation
    /// was recorded.
    pub fn observe_stage_duration(
        &self,
        job_id: JobId,
        stage: Stage,
        updated_at: chrono::DateTime<chrono::Utc>,
        duration_secs: f64,
    ) -> bool {
        let is_new = self.dedup.lock().mark_stage_event(job_id, stage, updated_at);
        if is_new {
            self.api_stage_duration_seconds.with_label_values(&[&stage.to_string()]).observe(duration_secs);
            self.job_stage_duration_seconds.with_label_values(&[&stage.to_string()]).observe(duration_secs);
        }
        is_new
    }

    /// Increments `api_stage_failures_total{stage}` and
    /// `job_stage_failures_total{stage}`, gated by the same dedup cache and
    /// key shape as [`Self::observe_stage_duration`].
    pub fn record_stage_failure(&self, job_id: JobId, stage: Stage, updated_at: chrono::DateTime<chrono::Utc>) -> bool {
        let is_new = self.dedup.lock().mark_stage_event(job_id, stage, updated_at);
        if is_new {
            self.api_stage_failures_total.with_label_values(&[&stage.to_string()]).inc();
            self.job_stage_failures_total.with_label_values(&[&stage.to_string()]).inc();
        }
        is_new
    }

    /// Test-only reset hook; production callers never call this.
    pub fn reset_for_tests(&self) {
        self.dedup.lock().clear();
    }
}
