// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cancels a job directly; stage runners observe the cancellation on
//! their next entry check rather than being actively revoked.

use std::sync::Arc;

use dubbing_orchestrator_domain::entities::Job;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::JobRepository;
use dubbing_orchestrator_domain::value_objects::{JobId, JobStatus, RequesterId};

pub struct CancelJobUseCase {
    jobs: Arc<dyn JobRepository>,
}

impl CancelJobUseCase {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    pub async fn execute(&self, job_id: JobId, client_id: &RequesterId) -> Result<Job, OrchestratorError> {
        let job = self
            .jobs
            .get_by_external_id(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("job", job_id.to_string()))?;

        if !job.is_owned_by(client_id) {
            return Err(OrchestratorError::conflict(format!("job {job_id} is not owned by {client_id}")));
        }

        if job.status == JobStatus::Success {
            return Err(OrchestratorError::validation(format!("job {job_id} has already succeeded")));
        }

        let now = chrono::Utc::now();
        self.jobs.cancel(job_id, now).await?;

        self.jobs
            .get_by_external_id(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::internal(format!("job {job_id} vanished after cancel")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubbing_orchestrator_domain::entities::Job;
    use dubbing_orchestrator_domain::repositories::JobPage;
    use dubbing_orchestrator_domain::value_objects::{AssetId, Stage, StageOutcome};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct FakeJobs {
        job: StdMutex<Option<Job>>,
    }

    #[async_trait::async_trait]
    impl JobRepository for FakeJobs {
        async fn create(&self, job: Job) -> Result<Job, OrchestratorError> {
            Ok(job)
        }
        async fn get_by_external_id(&self, id: JobId) -> Result<Option<Job>, OrchestratorError> {
            Ok(self.job.lock().unwrap().clone().filter(|j| j.external_id == id))
        }
        async fn list(&self, _page: u32, _page_size: u32) -> Result<JobPage, OrchestratorError> {
            unimplemented!()
        }
        async fn count_by_status(&self) -> Result<HashMap<JobStatus, u64>, OrchestratorError> {
            Ok(HashMap::new())
        }
        async fn count_running_by_stage(&self) -> Result<HashMap<Stage, u64>, OrchestratorError> {
            Ok(HashMap::new())
        }
        async fn fetch_recent(&self, _limit: u32) -> Result<Vec<Job>, OrchestratorError> {
            Ok(Vec::new())
        }
        async fn update_stage(
            &self,
            _job_id: JobId,
            _stage: Stage,
            _status: JobStatus,
            _progress: f64,
            _error: Option<String>,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn record_stage_history(
            &self,
            _job_id: JobId,
            _stage: Stage,
            _outcome: StageOutcome,
            _details: serde_json::Value,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn update_logs_key(&self, _job_id: JobId, _key: Option<String>, _now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn reset_for_retry(&self, _job_id: JobId, _resume_stage: Stage, _now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn cancel(&self, job_id: JobId, now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            let mut guard = self.job.lock().unwrap();
            if let Some(job) = guard.as_mut().filter(|j| j.external_id == job_id) {
                job.cancel(now);
            }
            Ok(())
        }
        async fn count_active_for_requester(&self, _client_id: &RequesterId) -> Result<u64, OrchestratorError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn rejects_cancelling_an_already_succeeded_job() {
        let mut job = Job::new(AssetId::new(), vec![], HashMap::new(), None);
        job.mark_success(chrono::Utc::now());
        let id = job.external_id;
        let use_case = CancelJobUseCase::new(Arc::new(FakeJobs { job: StdMutex::new(Some(job)) }));

        let err = use_case.execute(id, &RequesterId::anonymous()).await.unwrap_err();
        assert_eq!(err.status_hint(), 400);
    }

    #[tokio::test]
    async fn rejects_cancellation_from_a_non_owning_client() {
        let job = Job::new(AssetId::new(), vec![], HashMap::new(), Some(RequesterId::new("owner")));
        let id = job.external_id;
        let use_case = CancelJobUseCase::new(Arc::new(FakeJobs { job: StdMutex::new(Some(job)) }));

        let err = use_case.execute(id, &RequesterId::new("someone-else")).await.unwrap_err();
        assert_eq!(err.status_hint(), 403);
    }

    #[tokio::test]
    async fn cancels_a_running_job() {
        let mut job = Job::new(AssetId::new(), vec![], HashMap::new(), None);
        job.transition_running(Stage::Tts, chrono::Utc::now());
        let id = job.external_id;
        let use_case = CancelJobUseCase::new(Arc::new(FakeJobs { job: StdMutex::new(Some(job)) }));

        let cancelled = use_case.execute(id, &RequesterId::anonymous()).await.unwrap();
        assert_eq!(cancelled.status, JobStatus::Cancelled);
        assert_eq!(cancelled.failed_stage, Some(Stage::Tts));
    }
}
