// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Coordinator / Stage Runner
//!
//! Drives one job through ASR, TRANSLATE, TTS, ALIGN/MIX, and PACKAGE by
//! reacting to tasks pulled off the broker. Each stage task follows the
//! same shape: load the job and asset, bail out early if the job was
//! cancelled, skip the stage if a resume point has already produced its
//! artifact, otherwise invoke the stage worker per language that is still
//! missing its output, record the outcome, and enqueue the next stage (or
//! `finalize_job` after PACKAGE). A failed stage either re-enters the
//! broker's retry path or marks the job FAILED without a successor.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use dubbing_orchestrator_domain::entities::{Asset, Job, Segment};
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{
    AssetRepository, AsrWorker, JobRepository, MixWorker, PackageWorker, SegmentRepository, TaskBroker, TaskMessage, TaskName,
    TranslateWorker, TtsWorker,
};
use dubbing_orchestrator_domain::value_objects::{JobId, JobStatus, LanguageCode, RetryPolicy, Stage, StageOutcome};

use crate::infrastructure::artifact_store::ArtifactStore;
use crate::infrastructure::metrics::MetricsService;
use crate::observability::StageLogger;

fn task_name_for(stage: Stage) -> TaskName {
    match stage {
        Stage::Asr => TaskName::RunAsr,
        Stage::Translate => TaskName::RunTranslate,
        Stage::Tts => TaskName::RunTts,
        Stage::AlignMix => TaskName::RunAlignMix,
        Stage::Package => TaskName::RunPackage,
        Stage::Ingested | Stage::Published | Stage::Done => {
            unreachable!("{stage} is a bookend stage, not a task")
        }
    }
}

/// Everything the stage runner needs to execute one of the five runnable
/// stages. Not a trait: there is exactly one coordinator per process, and
/// swapping workers happens by swapping the `Arc<dyn ...>` fields at
/// construction time.
pub struct PipelineCoordinator {
    jobs: Arc<dyn JobRepository>,
    assets: Arc<dyn AssetRepository>,
    segments_repo: Arc<dyn SegmentRepository>,
    artifact_store: Arc<ArtifactStore>,
    broker: Arc<dyn TaskBroker>,
    asr: Arc<dyn AsrWorker>,
    translate: Arc<dyn TranslateWorker>,
    tts: Arc<dyn TtsWorker>,
    mix: Arc<dyn MixWorker>,
    package: Arc<dyn PackageWorker>,
    metrics: MetricsService,
    retry_policy: RetryPolicy,
    queue: String,
    /// Root directory raw storage keys (`raw/<asset>/...`) resolve under.
    data_dir: PathBuf,
}

#[allow(clippy::too_many_arguments)]
impl PipelineCoordinator {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        assets: Arc<dyn AssetRepository>,
        segments_repo: Arc<dyn SegmentRepository>,
        artifact_store: Arc<ArtifactStore>,
        broker: Arc<dyn TaskBroker>,
        asr: Arc<dyn AsrWorker>,
        translate: Arc<dyn TranslateWorker>,
        tts: Arc<dyn TtsWorker>,
        mix: Arc<dyn MixWorker>,
        package: Arc<dyn PackageWorker>,
        metrics: MetricsService,
        retry_policy: RetryPolicy,
        queue: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            jobs,
            assets,
            segments_repo,
            artifact_store,
            broker,
            asr,
            translate,
            tts,
            mix,
            package,
            metrics,
            retry_policy,
            queue: queue.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Dispatches one task pulled off the broker. Swallows and logs, rather
    /// than propagates, "the job or asset vanished" conditions: a worker
    /// loop calling this in a tight `dequeue` loop should keep running.
    pub async fn handle_task(&self, message: TaskMessage) {
        let result = match message.task {
            TaskName::RunPipeline => self.handle_run_pipeline(&message).await,
            TaskName::RunAsr => self.handle_stage(Stage::Asr, &message).await,
            TaskName::RunTranslate => self.handle_stage(Stage::Translate, &message).await,
            TaskName::RunTts => self.handle_stage(Stage::Tts, &message).await,
            TaskName::RunAlignMix => self.handle_stage(Stage::AlignMix, &message).await,
            TaskName::RunPackage => self.handle_stage(Stage::Package, &message).await,
            TaskName::FinalizeJob => self.handle_finalize(&message).await,
        };

        if let Err(err) = result {
            error!(task = %message.task, task_id = %message.task_id, error = %err, "task handler failed");
        }
    }

    fn job_id_from(&self, message: &TaskMessage) -> Result<JobId, OrchestratorError> {
        let raw = message
            .kwargs
            .get("job_id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| OrchestratorError::internal("task message is missing job_id"))?;
        JobId::from_str(raw)
    }

    fn resume_stage_from(&self, message: &TaskMessage) -> Stage {
        let raw = message.kwargs.get("resume_from").and_then(JsonValue::as_str);
        Stage::resolve_resume_from(raw)
    }

    fn stage_kwargs(&self, job_id: JobId, resume_stage: Stage) -> HashMap<String, JsonValue> {
        let mut kwargs = HashMap::new();
        kwargs.insert("job_id".to_string(), json!(job_id.to_string()));
        kwargs.insert("resume_from".to_string(), json!(resume_stage.to_string()));
        kwargs
    }

    async fn handle_run_pipeline(&self, message: &TaskMessage) -> Result<(), OrchestratorError> {
        let job_id = self.job_id_from(message)?;
        let resume_stage = self.resume_stage_from(message);
        self.broker
            .enqueue(TaskName::RunAsr, self.stage_kwargs(job_id, resume_stage), &self.queue)
            .await?;
        Ok(())
    }

    async fn handle_finalize(&self, message: &TaskMessage) -> Result<(), OrchestratorError> {
        let job_id = self.job_id_from(message)?;
        let job = match self.jobs.get_by_external_id(job_id).await? {
            Some(job) => job,
            None => {
                warn!(%job_id, "finalize_job fired for a job that no longer exists");
                return Ok(());
            }
        };

        if job.status == JobStatus::Cancelled {
            return Ok(());
        }

        let now = Utc::now();
        self.jobs.update_stage(job_id, Stage::Done, JobStatus::Success, 1.0, None, now).await?;

        if let Some(asset) = self.assets.get_by_external_id(job.asset_id).await? {
            let asset_ext = asset.external_id.to_string();
            let logger = StageLogger::open(job_id, asset_ext.clone(), self.artifact_store.logs_path(&asset_ext, &job_id.to_string()))?;
            logger.job_ended(json!({"status": JobStatus::Success.to_string()})).await;
        }
        Ok(())
    }

    /// Runs one of the five pipeline stages for `job_id`, per the stage
    /// runner protocol: cancellation check, skip-on-resume, invoke the
    /// worker for each language still missing its artifact, record the
    /// outcome, and advance the pipeline.
    async fn handle_stage(&self, stage: Stage, message: &TaskMessage) -> Result<(), OrchestratorError> {
        let job_id = self.job_id_from(message)?;
        let resume_stage = self.resume_stage_from(message);
        let attempt = message.attempt;

        let Some(job) = self.jobs.get_by_external_id(job_id).await? else {
            warn!(%job_id, %stage, "stage task fired for a job that no longer exists");
            return Ok(());
        };
        let Some(asset) = self.assets.get_by_external_id(job.asset_id).await? else {
            warn!(%job_id, asset_id = %job.asset_id, "stage task's asset no longer exists");
            return Ok(());
        };

        let asset_ext = asset.external_id.to_string();
        let logger = StageLogger::open(job_id, asset_ext.clone(), self.artifact_store.logs_path(&asset_ext, &job_id.to_string()))?;

        if job.status == JobStatus::Cancelled {
            let now = Utc::now();
            let details = json!({"reason": "cancelled"});
            self.jobs.record_stage_history(job_id, stage, StageOutcome::Skipped, details.clone(), now).await?;
            logger.stage_skipped(stage, "stage skipped: job cancelled", details).await;
            return Ok(());
        }

        let langs = job.resolved_target_langs(&asset.target_langs);
        let artifact_ready = self.artifact_ready(stage, &asset_ext, &asset, &langs);
        let should_skip = stage.stage_order() < resume_stage.stage_order() && artifact_ready;

        let now = Utc::now();
        self.jobs.update_stage(job_id, stage, JobStatus::Running, stage.baseline_progress(), None, now).await?;

        if should_skip {
            let details = json!({"reason": "resumed past this stage"});
            self.jobs.record_stage_history(job_id, stage, StageOutcome::Skipped, details.clone(), now).await?;
            logger.stage_skipped(stage, "stage skipped on resume", details).await;
            return self.advance_after(stage, job_id, resume_stage).await;
        }

        logger.stage_started(stage).await;
        self.metrics.mark_stage_started(stage);
        let start = Instant::now();

        let outcome = self.run_stage_worker(stage, &job, &asset, &langs).await;
        self.metrics.mark_stage_finished(stage);

        match outcome {
            Ok(per_language) => {
                let duration = start.elapsed();
                let now = Utc::now();
                let details = json!({"languages": per_language, "durationMs": duration.as_millis() as u64});
                self.jobs.record_stage_history(job_id, stage, StageOutcome::Success, details.clone(), now).await?;
                self.metrics.observe_stage_duration(job_id, stage, now, duration.as_secs_f64());
                logger.stage_succeeded(stage, details).await;
                self.advance_after(stage, job_id, resume_stage).await
            }
            Err(err) => {
                let now = Utc::now();
                self.metrics.record_stage_failure(job_id, stage, now);
                logger.stage_failed(stage, &err.to_string()).await;

                if err.is_retryable() && attempt < self.retry_policy.max_attempts {
                    let details = json!({"attempt": attempt, "error": err.to_string()});
                    self.jobs.record_stage_history(job_id, stage, StageOutcome::Retrying, details, now).await?;
                    logger.stage_retrying(stage, attempt + 1).await;
                    self.broker
                        .enqueue_retry(
                            task_name_for(stage),
                            self.stage_kwargs(job_id, resume_stage),
                            &self.queue,
                            attempt + 1,
                            &self.retry_policy,
                        )
                        .await?;
                } else {
                    let details = json!({"error": err.to_string()});
                    self.jobs.record_stage_history(job_id, stage, StageOutcome::Failed, details, now).await?;
                    self.jobs
                        .update_stage(job_id, stage, JobStatus::Failed, stage.baseline_progress(), Some(err.to_string()), now)
                        .await?;
                }
                Ok(())
            }
        }
    }

    async fn advance_after(&self, stage: Stage, job_id: JobId, resume_stage: Stage) -> Result<(), OrchestratorError> {
        match stage.next() {
            Some(next_stage) => {
                self.broker
                    .enqueue(task_name_for(next_stage), self.stage_kwargs(job_id, resume_stage), &self.queue)
                    .await?;
            }
            None => {
                let mut kwargs = HashMap::new();
                kwargs.insert("job_id".to_string(), json!(job_id.to_string()));
                self.broker.enqueue(TaskName::FinalizeJob, kwargs, &self.queue).await?;
            }
        }
        Ok(())
    }

    fn artifact_ready(&self, stage: Stage, asset_ext: &str, asset: &Asset, langs: &[LanguageCode]) -> bool {
        match stage {
            Stage::Asr => self.artifact_store.has_asr(asset_ext),
            Stage::Translate => self.artifact_store.missing_translations(asset_ext, langs).is_empty(),
            Stage::Tts => self.artifact_store.missing_tts(asset_ext, langs).is_empty(),
            Stage::AlignMix => self.artifact_store.missing_mixes(asset_ext, langs).is_empty(),
            Stage::Package => self.artifact_store.missing_packages(asset, langs).is_empty(),
            Stage::Ingested | Stage::Published | Stage::Done => true,
        }
    }

    fn source_audio_path(&self, asset: &Asset) -> Result<PathBuf, OrchestratorError> {
        let key = asset
            .storage_key(dubbing_orchestrator_domain::entities::ROLE_RAW)
            .ok_or_else(|| OrchestratorError::stage_prerequisite_missing("ASR", "asset has no raw storage key"))?;
        Ok(self.data_dir.join(key))
    }

    async fn run_stage_worker(&self, stage: Stage, job: &Job, asset: &Asset, langs: &[LanguageCode]) -> Result<JsonValue, OrchestratorError> {
        match stage {
            Stage::Asr => self.run_asr(asset).await,
            Stage::Translate => self.run_translate(job, asset, langs).await,
            Stage::Tts => self.run_tts(job, asset, langs).await,
            Stage::AlignMix => self.run_mix(asset, langs).await,
            Stage::Package => self.run_package(asset, langs).await,
            Stage::Ingested | Stage::Published | Stage::Done => {
                unreachable!("{stage} is a bookend stage, not a runnable one")
            }
        }
    }

    async fn run_asr(&self, asset: &Asset) -> Result<JsonValue, OrchestratorError> {
        let asset_ext = asset.external_id.to_string();
        let source_path = self.source_audio_path(asset)?;
        let output_dir = self.artifact_store.asr_dir(&asset_ext);
        let segments = self.asr.transcribe(&source_path, &output_dir, None).await?;
        self.segments_repo.upsert_asr(asset.external_id, &segments).await?;
        Ok(json!({"segments": segments.len()}))
    }

    async fn load_segments(&self, path: &PathBuf, stage: &'static str) -> Result<Vec<Segment>, OrchestratorError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| OrchestratorError::stage_prerequisite_missing(stage, format!("missing {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| OrchestratorError::worker_failed(stage, format!("corrupt segment file: {e}"), false))
    }

    async fn run_translate(&self, _job: &Job, asset: &Asset, langs: &[LanguageCode]) -> Result<JsonValue, OrchestratorError> {
        let asset_ext = asset.external_id.to_string();
        let segments = self.load_segments(&self.artifact_store.asr_segments_path(&asset_ext), "TRANSLATE").await?;
        let output_dir = self.artifact_store.translations_dir(&asset_ext);

        let mut results = serde_json::Map::new();
        for lang in langs {
            if self.artifact_store.translation_segments_path(&asset_ext, lang).is_file() {
                results.insert(lang.as_str().to_string(), json!("existing"));
                continue;
            }
            let translated = self.translate.translate(&segments, &output_dir, lang, None).await?;
            self.segments_repo.update_translations(asset.external_id, &translated).await?;
            results.insert(lang.as_str().to_string(), json!("success"));
        }
        Ok(JsonValue::Object(results))
    }

    async fn run_tts(&self, job: &Job, asset: &Asset, langs: &[LanguageCode]) -> Result<JsonValue, OrchestratorError> {
        let asset_ext = asset.external_id.to_string();
        let output_dir = self.artifact_store.tts_root(&asset_ext);

        let mut results = serde_json::Map::new();
        for lang in langs {
            if !self.artifact_store.missing_tts(&asset_ext, std::slice::from_ref(lang)).is_empty() {
                let mut segments = self
                    .load_segments(&self.artifact_store.translation_segments_path(&asset_ext, lang), "TTS")
                    .await?;
                let synth_paths = self.tts.synthesize(&segments, &output_dir, lang, &job.presets).await?;
                for (segment, path) in segments.iter_mut().zip(synth_paths.iter()) {
                    segment.synth_key = Some(path.display().to_string());
                }
                self.segments_repo.update_synth_keys(asset.external_id, &segments).await?;
                results.insert(lang.as_str().to_string(), json!("success"));
            } else {
                results.insert(lang.as_str().to_string(), json!("existing"));
            }
        }
        Ok(JsonValue::Object(results))
    }

    async fn run_mix(&self, asset: &Asset, langs: &[LanguageCode]) -> Result<JsonValue, OrchestratorError> {
        let asset_ext = asset.external_id.to_string();
        let output_dir = self.artifact_store.mix_root(&asset_ext);
        let source_path = self.source_audio_path(asset).ok();

        let mut results = serde_json::Map::new();
        for lang in langs {
            if !self.artifact_store.missing_mixes(&asset_ext, std::slice::from_ref(lang)).is_empty() {
                let segments = self
                    .load_segments(&self.artifact_store.translation_segments_path(&asset_ext, lang), "ALIGN/MIX")
                    .await?;
                let synth_paths: Vec<PathBuf> = (0..segments.len() as u32)
                    .map(|idx| self.artifact_store.tts_segment_path(&asset_ext, lang, idx))
                    .collect();
                self.mix.mix(&segments, &synth_paths, &output_dir, source_path.as_ref(), lang).await?;
                results.insert(lang.as_str().to_string(), json!("success"));
            } else {
                results.insert(lang.as_str().to_string(), json!("existing"));
            }
        }
        Ok(JsonValue::Object(results))
    }

    async fn run_package(&self, asset: &Asset, langs: &[LanguageCode]) -> Result<JsonValue, OrchestratorError> {
        let asset_ext = asset.external_id.to_string();

        let mut results = serde_json::Map::new();
        for lang in langs {
            if self.artifact_store.missing_packages(asset, std::slice::from_ref(lang)).is_empty() {
                results.insert(lang.as_str().to_string(), json!("existing"));
                continue;
            }
            let dubbed_path = self.artifact_store.dubbed_path(&asset_ext, lang);
            let output = self.package.package(&asset_ext, &dubbed_path, lang).await?;
            self.assets.set_storage_key(asset.external_id, "public", &output.master_key).await?;
            self.assets
                .set_storage_key(asset.external_id, &dubbing_orchestrator_domain::entities::public_role_for(lang), &output.audio_key)
                .await?;
            results.insert(lang.as_str().to_string(), json!("success"));
        }
        Ok(JsonValue::Object(results))
    }
}
