// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Creates a job and enqueues its `run_pipeline` entry task.

use std::collections::HashMap;
use std::sync::Arc;

use dubbing_orchestrator_domain::entities::{Asset, Job};
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{AssetRepository, JobRepository, TaskBroker, TaskName};
use dubbing_orchestrator_domain::value_objects::{AssetId, LanguageCode, RequesterId, Stage};

pub struct CreateTranslationJobUseCase {
    jobs: Arc<dyn JobRepository>,
    assets: Arc<dyn AssetRepository>,
    broker: Arc<dyn TaskBroker>,
    allowed_languages: Vec<LanguageCode>,
    max_active_jobs_per_key: u32,
    queue: String,
}

impl CreateTranslationJobUseCase {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        assets: Arc<dyn AssetRepository>,
        broker: Arc<dyn TaskBroker>,
        allowed_languages: Vec<LanguageCode>,
        max_active_jobs_per_key: u32,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            jobs,
            assets,
            broker,
            allowed_languages,
            max_active_jobs_per_key,
            queue: queue.into(),
        }
    }

    pub async fn execute(
        &self,
        asset_id: AssetId,
        target_langs: Vec<LanguageCode>,
        presets: HashMap<String, String>,
        resume_from: Option<Stage>,
        client_id: RequesterId,
    ) -> Result<Job, OrchestratorError> {
        let asset = self
            .assets
            .get_by_external_id(asset_id)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("asset", asset_id.to_string()))?;

        let langs_to_validate = if target_langs.is_empty() { asset.target_langs.clone() } else { target_langs.clone() };
        Asset::validate_languages_allowed(&langs_to_validate, &self.allowed_languages)?;

        if !client_id.is_anonymous() && self.max_active_jobs_per_key > 0 {
            let active = self.jobs.count_active_for_requester(&client_id).await?;
            if active >= self.max_active_jobs_per_key as u64 {
                return Err(OrchestratorError::quota_exceeded(client_id.as_str(), self.max_active_jobs_per_key));
            }
        }

        if asset.target_langs.is_empty() && !target_langs.is_empty() {
            self.assets.populate_target_langs_if_absent(asset_id, &target_langs).await?;
        }

        let job = Job::new(asset_id, target_langs, presets, Some(client_id));
        let created = self.jobs.create(job).await?;

        let mut kwargs = HashMap::new();
        kwargs.insert("job_id".to_string(), serde_json::json!(created.external_id.to_string()));
        if let Some(stage) = resume_from {
            kwargs.insert("resume_from".to_string(), serde_json::json!(stage.to_string()));
        }
        self.broker.enqueue(TaskName::RunPipeline, kwargs, &self.queue).await?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubbing_orchestrator_domain::repositories::JobPage;
    use dubbing_orchestrator_domain::value_objects::{JobId, JobStatus, StageOutcome};
    use std::sync::Mutex as StdMutex;

    struct FakeAssets {
        asset: Asset,
    }

    #[async_trait::async_trait]
    impl AssetRepository for FakeAssets {
        async fn create(&self, asset: Asset) -> Result<Asset, OrchestratorError> {
            Ok(asset)
        }
        async fn get_by_external_id(&self, id: AssetId) -> Result<Option<Asset>, OrchestratorError> {
            Ok((id == self.asset.external_id).then(|| self.asset.clone()))
        }
        async fn set_storage_key(&self, _id: AssetId, _role: &str, _key: &str) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn populate_target_langs_if_absent(&self, _id: AssetId, _langs: &[LanguageCode]) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn complete_upload(&self, _id: AssetId, _src: Option<LanguageCode>, _tgt: Vec<LanguageCode>) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeJobs {
        created: StdMutex<Vec<Job>>,
        active_count: u64,
    }

    #[async_trait::async_trait]
    impl JobRepository for FakeJobs {
        async fn create(&self, job: Job) -> Result<Job, OrchestratorError> {
            self.created.lock().unwrap().push(job.clone());
            Ok(job)
        }
        async fn get_by_external_id(&self, _id: JobId) -> Result<Option<Job>, OrchestratorError> {
            Ok(None)
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
        async fn cancel(&self, _job_id: JobId, _now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn count_active_for_requester(&self, _client_id: &RequesterId) -> Result<u64, OrchestratorError> {
            Ok(self.active_count)
        }
    }

    struct FakeBroker {
        enqueued: StdMutex<Vec<TaskName>>,
    }

    #[async_trait::async_trait]
    impl TaskBroker for FakeBroker {
        async fn enqueue(
            &self,
            task: TaskName,
            _kwargs: HashMap<String, serde_json::Value>,
            _queue: &str,
        ) -> Result<String, OrchestratorError> {
            self.enqueued.lock().unwrap().push(task);
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

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[tokio::test]
    async fn rejects_languages_outside_the_allowlist() {
        let asset = Asset::new(None, None);
        let use_case = CreateTranslationJobUseCase::new(
            Arc::new(FakeJobs::default()),
            Arc::new(FakeAssets { asset: asset.clone() }),
            Arc::new(FakeBroker { enqueued: StdMutex::new(vec![]) }),
            vec![lang("en"), lang("es")],
            0,
            "pipeline",
        );

        let err = use_case
            .execute(asset.external_id, vec![lang("ja")], HashMap::new(), None, RequesterId::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.status_hint(), 422);
    }

    #[tokio::test]
    async fn enqueues_run_pipeline_on_success() {
        let mut asset = Asset::new(None, None);
        asset.set_storage_key(dubbing_orchestrator_domain::entities::ROLE_RAW, "raw/a/source.wav");
        let broker = Arc::new(FakeBroker { enqueued: StdMutex::new(vec![]) });

        let use_case = CreateTranslationJobUseCase::new(
            Arc::new(FakeJobs::default()),
            Arc::new(FakeAssets { asset: asset.clone() }),
            broker.clone(),
            vec![lang("es")],
            0,
            "pipeline",
        );

        use_case
            .execute(asset.external_id, vec![lang("es")], HashMap::new(), None, RequesterId::anonymous())
            .await
            .unwrap();

        assert_eq!(broker.enqueued.lock().unwrap().as_slice(), &[TaskName::RunPipeline]);
    }

    #[tokio::test]
    async fn enforces_the_active_job_quota_for_named_requesters() {
        let asset = Asset::new(None, None);
        let jobs = Arc::new(FakeJobs {
            created: StdMutex::new(vec![]),
            active_count: 2,
        });
        let use_case = CreateTranslationJobUseCase::new(
            jobs,
            Arc::new(FakeAssets { asset: asset.clone() }),
            Arc::new(FakeBroker { enqueued: StdMutex::new(vec![]) }),
            vec![lang("es")],
            2,
            "pipeline",
        );

        let err = use_case
            .execute(asset.external_id, vec![lang("es")], HashMap::new(), None, RequesterId::new("client-x"))
            .await
            .unwrap_err();
        assert_eq!(err.status_hint(), 429);
    }
}
