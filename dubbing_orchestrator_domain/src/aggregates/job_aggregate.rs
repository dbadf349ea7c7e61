// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Aggregate
//!
//! Wraps a [`Job`] entity with the domain-event bookkeeping the
//! Observability Plane depends on: every state-changing method records the
//! corresponding [`JobEvent`] so a caller can drain them with
//! [`JobAggregate::take_uncommitted_events`] and turn each into a structured
//! log line / metric observation, without the stage runner or pipeline
//! coordinator having to remember to do so at every call site.
//!
//! Persistence itself is plain CRUD through [`JobRepository`] — this is not
//! an event-sourced store; `from_events` is provided for completeness (and
//! is useful in tests that want to assert on exactly what a sequence of
//! operations produced) but the repository always persists the current
//! [`Job`] snapshot, not the event log.
//!
//! [`JobRepository`]: crate::repositories::job_repository::JobRepository

use chrono::{DateTime, Utc};

use crate::entities::Job;
use crate::events::{JobCreatedEvent, JobEvent, JobTerminatedEvent, StageTransitionEvent};
use crate::value_objects::{AssetId, JobId, LanguageCode, RequesterId, Stage, StageOutcome};

pub struct JobAggregate {
    job: Job,
    uncommitted_events: Vec<JobEvent>,
}

impl JobAggregate {
    /// Starts a new aggregate for a freshly created job, recording a
    /// `Created` event.
    pub fn create(
        asset_id: AssetId,
        target_langs: Vec<LanguageCode>,
        presets: std::collections::HashMap<String, String>,
        requested_by: Option<RequesterId>,
    ) -> Self {
        let job = Job::new(asset_id, target_langs, presets, requested_by);
        let event = JobEvent::Created(JobCreatedEvent {
            job_id: job.external_id,
            asset_id: job.asset_id,
            occurred_at: job.created_at,
        });
        Self {
            job,
            uncommitted_events: vec![event],
        }
    }

    /// Wraps an existing, persisted job with no pending events.
    pub fn from_existing(job: Job) -> Self {
        Self {
            job,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    pub fn job_id(&self) -> JobId {
        self.job.external_id
    }

    /// Drains and returns events recorded since the last drain.
    pub fn take_uncommitted_events(&mut self) -> Vec<JobEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn push(&mut self, event: JobEvent) {
        self.uncommitted_events.push(event);
    }

    pub fn transition_running(&mut self, stage: Stage, now: DateTime<Utc>) {
        self.job.transition_running(stage, now);
    }

    /// Records a stage outcome on the wrapped job and raises the matching
    /// [`StageTransitionEvent`].
    pub fn record_stage_outcome(&mut self, stage: Stage, outcome: StageOutcome, details: serde_json::Value, now: DateTime<Utc>) {
        self.job.record_stage_history(stage, outcome, details.clone(), now);
        self.push(JobEvent::StageTransitioned(StageTransitionEvent {
            job_id: self.job.external_id,
            asset_id: self.job.asset_id,
            stage,
            outcome,
            details,
            occurred_at: now,
        }));
    }

    pub fn mark_failed(&mut self, stage: Stage, message: impl Into<String>, now: DateTime<Utc>) {
        self.job.mark_failed(stage, message, now);
        self.push_terminated(now);
    }

    pub fn mark_success(&mut self, now: DateTime<Utc>) {
        self.job.mark_success(now);
        self.push_terminated(now);
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.job.cancel(now);
        self.push_terminated(now);
    }

    fn push_terminated(&mut self, now: DateTime<Utc>) {
        self.push(JobEvent::Terminated(JobTerminatedEvent {
            job_id: self.job.external_id,
            asset_id: self.job.asset_id,
            status: self.job.status,
            failed_stage: self.job.failed_stage,
            occurred_at: now,
        }));
    }

    pub fn reset_for_retry(&mut self, resume_stage: Stage, now: DateTime<Utc>) {
        self.job.reset_for_retry(resume_stage, now);
    }

    /// Replays a sequence of events against a blank job, for tests that
    /// want to assert purely on event content rather than on the
    /// repository's persisted snapshot.
    pub fn from_events(asset_id: AssetId, events: &[JobEvent]) -> Option<Job> {
        let first = events.first()?;
        let JobEvent::Created(created) = first else {
            return None;
        };
        let mut job = Job::new(asset_id, Vec::new(), std::collections::HashMap::new(), None);
        job.external_id = created.job_id;

        for event in &events[1..] {
            match event {
                JobEvent::Created(_) => {}
                JobEvent::StageTransitioned(e) => {
                    job.record_stage_history(e.stage, e.outcome, e.details.clone(), e.occurred_at);
                }
                JobEvent::Terminated(e) => {
                    job.status = e.status;
                    job.failed_stage = e.failed_stage;
                    job.ended_at = Some(e.occurred_at);
                }
            }
        }
        Some(job)
    }
}
