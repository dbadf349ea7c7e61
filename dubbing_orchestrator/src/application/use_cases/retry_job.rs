// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Resets a job to a resume stage and re-enters the pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use dubbing_orchestrator_domain::entities::Job;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{JobRepository, TaskBroker, TaskName};
use dubbing_orchestrator_domain::value_objects::{JobId, RequesterId, Stage};

pub struct RetryJobUseCase {
    jobs: Arc<dyn JobRepository>,
    broker: Arc<dyn TaskBroker>,
    queue: String,
}

impl RetryJobUseCase {
    pub fn new(jobs: Arc<dyn JobRepository>, broker: Arc<dyn TaskBroker>, queue: impl Into<String>) -> Self {
        Self {
            jobs,
            broker,
            queue: queue.into(),
        }
    }

    pub async fn execute(&self, job_id: JobId, resume_from: Option<Stage>, client_id: &RequesterId) -> Result<Job, OrchestratorError> {
        let job = self
            .jobs
            .get_by_external_id(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("job", job_id.to_string()))?;

        if !job.is_owned_by(client_id) {
            return Err(OrchestratorError::conflict(format!("job {job_id} is not owned by {client_id}")));
        }

        let resume_stage = resume_from.unwrap_or(Stage::Asr);
        let now = chrono::Utc::now();
        self.jobs.reset_for_retry(job_id, resume_stage, now).await?;

        let mut kwargs = HashMap::new();
        kwargs.insert("job_id".to_string(), serde_json::json!(job_id.to_string()));
        kwargs.insert("resume_from".to_string(), serde_json::json!(resume_stage.to_string()));
        self.broker.enqueue(TaskName::RunPipeline, kwargs, &self.queue).await?;

        self.jobs
            .get_by_external_id(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::internal(format!("job {job_id} vanished after retry reset")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubbing_orchestrator_domain::entities::Job;
    use dubbing_orchestrator_domain::repositories::JobPage;
    use dubbing_orchestrator_domain::value_objects::{AssetId, JobStatus, StageOutcome};
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
        async fn reset_for_retry(&self, job_id: JobId, resume_stage: Stage, now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            let mut guard = self.job.lock().unwrap();
            if let Some(job) = guard.as_mut().filter(|j| j.external_id == job_id) {
                job.reset_for_retry(resume_stage, now);
            }
            Ok(())
        }
        async fn cancel(&self, _job_id: JobId, _now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn count_active_for_requester(&self, _client_id: &RequesterId) -> Result<u64, OrchestratorError> {
            Ok(0)
        }
    }

    struct FakeBroker;

    #[async_trait::async_trait]
    impl TaskBroker for FakeBroker {
        async fn enqueue(&self, _task: TaskName, _kwargs: HashMap<String, serde_json::Value>, _queue: &str) -> Result<String, OrchestratorError> {
            Ok("task-1".to_string())
        }
        async fn enqueue_retry(
            &self,
            _task: TaskName,
            _kwargs: HashMap<String, serde_json::Value>,
            _queue: &str,
            _attempt: u32,
            _policy: &dubbing_orchestrator_domain::value_objects::RetryPolicy,
        ) -> Result<String, OrchestratorError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn rejects_a_retry_from_a_non_owning_client() {
        let job = Job::new(AssetId::new(), vec![], HashMap::new(), Some(RequesterId::new("owner")));
        let id = job.external_id;
        let use_case = RetryJobUseCase::new(Arc::new(FakeJobs { job: StdMutex::new(Some(job)) }), Arc::new(FakeBroker), "pipeline");

        let err = use_case.execute(id, None, &RequesterId::new("someone-else")).await.unwrap_err();
        assert_eq!(err.status_hint(), 403);
    }

    #[tokio::test]
    async fn resets_the_job_to_the_requested_resume_stage() {
        let mut job = Job::new(AssetId::new(), vec![], HashMap::new(), None);
        job.mark_failed(Stage::Tts, "boom", chrono::Utc::now());
        let id = job.external_id;

        let use_case = RetryJobUseCase::new(Arc::new(FakeJobs { job: StdMutex::new(Some(job)) }), Arc::new(FakeBroker), "pipeline");

        let retried = use_case.execute(id, Some(Stage::Tts), &RequesterId::anonymous()).await.unwrap();
        assert_eq!(retried.stage, Stage::Tts);
        assert_eq!(retried.status, JobStatus::Pending);
    }
}
