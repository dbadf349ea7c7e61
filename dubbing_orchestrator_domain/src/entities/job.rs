// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job Entity
//!
//! One requested translation run over an [`Asset`] into one or more target
//! languages. `Job` owns the state-transition rules the Pipeline
//! Coordinator and Stage Runner rely on: when `started_at`/`ended_at` get
//! set, how `stage_history` slots are written, and what retry and
//! cancellation do to the row. None of these methods perform I/O; they
//! mutate the in-memory entity and the repository persists the result.
//!
//! [`Asset`]: super::asset::Asset

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{AssetId, JobId, JobStatus, LanguageCode, RequesterId, Stage, StageHistoryEntry, StageOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub row_id: Option<i64>,
    pub external_id: JobId,
    pub asset_id: AssetId,
    pub stage: Stage,
    pub status: JobStatus,
    pub progress: f64,
    pub target_langs: Vec<LanguageCode>,
    pub presets: HashMap<String, String>,
    pub requested_by: Option<RequesterId>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub failed_stage: Option<Stage>,
    pub error_message: Option<String>,
    pub logs_key: Option<String>,
    pub stage_history: HashMap<Stage, StageHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Creates a new job: `stage=ASR, status=PENDING, progress=0`.
    pub fn new(
        asset_id: AssetId,
        target_langs: Vec<LanguageCode>,
        presets: HashMap<String, String>,
        requested_by: Option<RequesterId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            row_id: None,
            external_id: JobId::new(),
            asset_id,
            stage: Stage::Asr,
            status: JobStatus::Pending,
            progress: 0.0,
            target_langs,
            presets,
            requested_by,
            started_at: None,
            ended_at: None,
            failed_stage: None,
            error_message: None,
            logs_key: None,
            stage_history: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The language set the Stage Runner resolves for this job: the job's
    /// own `target_langs`, falling back to the asset's, falling back to
    /// `["es"]`.
    pub fn resolved_target_langs(&self, asset_target_langs: &[LanguageCode]) -> Vec<LanguageCode> {
        if !self.target_langs.is_empty() {
            self.target_langs.clone()
        } else if !asset_target_langs.is_empty() {
            asset_target_langs.to_vec()
        } else {
            vec![LanguageCode::new("es").expect("'es' is a valid language code")]
        }
    }

    /// Transitions the job to RUNNING at `stage` with its baseline
    /// progress. Sets `started_at` the first time the job leaves PENDING;
    /// never touches it again within the same attempt.
    pub fn transition_running(&mut self, stage: Stage, now: DateTime<Utc>) {
        if self.status == JobStatus::Pending {
            self.started_at = Some(now);
        }
        self.status = JobStatus::Running;
        self.stage = stage;
        self.progress = self.progress.max(stage.baseline_progress());
        self.updated_at = now;
    }

    /// Records the outcome of a stage attempt, overwriting that stage's
    /// history slot.
    pub fn record_stage_history(&mut self, stage: Stage, outcome: StageOutcome, details: serde_json::Value, now: DateTime<Utc>) {
        self.stage_history
            .insert(stage, StageHistoryEntry::new(outcome, details, now));
        self.updated_at = now;
    }

    /// Marks the job FAILED with the given failing stage and message;
    /// `failed_stage` is non-null iff status is FAILED or CANCELLED.
    pub fn mark_failed(&mut self, stage: Stage, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.failed_stage = Some(stage);
        self.error_message = Some(message.into());
        self.ended_at = Some(now);
        self.updated_at = now;
    }

    /// Marks the job SUCCESS: `stage=DONE`, `progress=1.0` (the terminal
    /// effect of the `finalize_job` task).
    pub fn mark_success(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Success;
        self.stage = Stage::Done;
        self.progress = 1.0;
        self.ended_at = Some(now);
        self.updated_at = now;
    }

    /// Cancels the job: `status=CANCELLED`, `failed_stage=`current stage,
    /// `progress=1.0`, `ended_at=now`.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.failed_stage = Some(self.stage);
        self.status = JobStatus::Cancelled;
        self.progress = 1.0;
        self.ended_at = Some(now);
        self.updated_at = now;
    }

    /// Resets the job for a fresh attempt from `resume_stage`: clears
    /// `failed_stage`, `error_message`, `started_at`, `ended_at`; sets
    /// `stage=resume_stage, status=PENDING, progress=0`. `stage_history`
    /// is kept.
    pub fn reset_for_retry(&mut self, resume_stage: Stage, now: DateTime<Utc>) {
        self.failed_stage = None;
        self.error_message = None;
        self.started_at = None;
        self.ended_at = None;
        self.stage = resume_stage;
        self.status = JobStatus::Pending;
        self.progress = 0.0;
        self.updated_at = now;
    }

    pub fn update_logs_key(&mut self, key: Option<String>, now: DateTime<Utc>) {
        self.logs_key = key;
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, client_id: &RequesterId) -> bool {
        match &self.requested_by {
            Some(owner) => owner == client_id,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_id() -> AssetId {
        AssetId::new()
    }

    #[test]
    fn started_at_is_set_exactly_once_on_first_running_transition() {
        let mut job = Job::new(asset_id(), vec![], HashMap::new(), None);
        let t1 = Utc::now();
        job.transition_running(Stage::Asr, t1);
        assert_eq!(job.started_at, Some(t1));

        let t2 = t1 + chrono::Duration::seconds(5);
        job.transition_running(Stage::Translate, t2);
        assert_eq!(job.started_at, Some(t1), "started_at must not move on later transitions");
    }

    #[test]
    fn ended_at_is_set_on_terminal_transitions_and_not_before() {
        let mut job = Job::new(asset_id(), vec![], HashMap::new(), None);
        assert!(job.ended_at.is_none());
        job.transition_running(Stage::Asr, Utc::now());
        assert!(job.ended_at.is_none());

        let now = Utc::now();
        job.mark_success(now);
        assert_eq!(job.ended_at, Some(now));
    }

    #[test]
    fn failed_stage_is_set_iff_failed_or_cancelled() {
        let mut job = Job::new(asset_id(), vec![], HashMap::new(), None);
        assert!(job.failed_stage.is_none());

        job.mark_failed(Stage::Tts, "boom", Utc::now());
        assert_eq!(job.failed_stage, Some(Stage::Tts));

        let mut job2 = Job::new(asset_id(), vec![], HashMap::new(), None);
        job2.transition_running(Stage::Asr, Utc::now());
        job2.cancel(Utc::now());
        assert_eq!(job2.failed_stage, Some(Stage::Asr));
    }

    #[test]
    fn reset_for_retry_clears_timestamps_and_error_but_keeps_history() {
        let mut job = Job::new(asset_id(), vec![], HashMap::new(), None);
        job.transition_running(Stage::Asr, Utc::now());
        job.record_stage_history(Stage::Asr, StageOutcome::Success, serde_json::json!({}), Utc::now());
        job.mark_failed(Stage::Translate, "network blip", Utc::now());

        job.reset_for_retry(Stage::Translate, Utc::now());

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.stage, Stage::Translate);
        assert_eq!(job.progress, 0.0);
        assert!(job.failed_stage.is_none());
        assert!(job.error_message.is_none());
        assert!(job.started_at.is_none());
        assert!(job.ended_at.is_none());
        assert!(job.stage_history.contains_key(&Stage::Asr), "history must survive a retry reset");
    }

    #[test]
    fn resolved_target_langs_falls_back_through_job_then_asset_then_default() {
        let es = LanguageCode::new("es").unwrap();
        let fr = LanguageCode::new("fr").unwrap();

        let with_job_langs = Job::new(asset_id(), vec![fr.clone()], HashMap::new(), None);
        assert_eq!(with_job_langs.resolved_target_langs(&[es.clone()]), vec![fr]);

        let without_job_langs = Job::new(asset_id(), vec![], HashMap::new(), None);
        assert_eq!(without_job_langs.resolved_target_langs(&[es.clone()]), vec![es]);

        let with_nothing = Job::new(asset_id(), vec![], HashMap::new(), None);
        assert_eq!(
            with_nothing.resolved_target_langs(&[]),
            vec![LanguageCode::new("es").unwrap()]
        );
    }

    #[test]
    fn ownership_check_treats_unowned_jobs_as_accessible_to_anyone() {
        let job = Job::new(asset_id(), vec![], HashMap::new(), None);
        assert!(job.is_owned_by(&RequesterId::new("anyone")));

        let mut owned = Job::new(asset_id(), vec![], HashMap::new(), Some(RequesterId::new("client-x")));
        owned.requested_by = Some(RequesterId::new("client-x"));
        assert!(owned.is_owned_by(&RequesterId::new("client-x")));
        assert!(!owned.is_owned_by(&RequesterId::new("client-y")));
    }
}
