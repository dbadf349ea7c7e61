//! Drives one job through ASR, Translate, TTS, Align/Mix, and Package end
//! to end, then asserts the job reached `Done`/`Success` and that every
//! stage's artifact and the published package actually landed on disk.

use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use dubbing_orchestrator::application::use_cases::CreateTranslationJobUseCase;
use dubbing_orchestrator::infrastructure::repositories::{initialize_database, SqliteAssetRepository, SqliteJobRepository, SqliteSegmentRepository};
use dubbing_orchestrator::infrastructure::workers::{FsPackageWorker, StubAsrWorker, StubMixWorker, StubTranslateWorker, StubTtsWorker};
use dubbing_orchestrator::infrastructure::{ArtifactStore, InProcessTaskBroker, MetricsService};
use dubbing_orchestrator::{OrchestratorError, PipelineCoordinator};
use dubbing_orchestrator_domain::entities::ROLE_RAW;
use dubbing_orchestrator_domain::repositories::{AssetRepository, SegmentRepository};
use dubbing_orchestrator_domain::value_objects::{JobStatus, LanguageCode, RequesterId, RetryPolicy, Stage};

fn lang(s: &str) -> LanguageCode {
    LanguageCode::new(s).expect("valid language code")
}

/// Repeatedly pulls from the broker and hands each message to the
/// coordinator until the queue sits empty for `idle_for`, which here means
/// "the pipeline has finished" rather than "a worker would keep polling
/// forever".
async fn drain(coordinator: &PipelineCoordinator, broker: &InProcessTaskBroker, queue: &str, idle_for: Duration) {
    loop {
        match tokio::time::timeout(idle_for, broker.dequeue(queue)).await {
            Ok(message) => coordinator.handle_task(message).await,
            Err(_) => break,
        }
    }
}

#[tokio::test]
async fn a_job_runs_through_every_stage_and_publishes_the_package() -> Result<(), OrchestratorError> {
    let db_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", db_file.path().display());
    let pool = initialize_database(&db_url).await.map_err(|e| OrchestratorError::repository(e.to_string()))?;

    let data_dir = tempfile::tempdir().unwrap();
    let raw_path = data_dir.path().join("raw/abc/demo.wav");
    tokio::fs::create_dir_all(raw_path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&raw_path, vec![7u8; 16_384]).await.unwrap();

    let assets = Arc::new(SqliteAssetRepository::new(pool.clone()));
    let jobs = Arc::new(SqliteJobRepository::new(pool.clone()));
    let segments = Arc::new(SqliteSegmentRepository::new(pool));
    let artifact_store = Arc::new(ArtifactStore::new(data_dir.path().join("proc")));
    let broker = Arc::new(InProcessTaskBroker::new());
    let metrics = MetricsService::new()?;

    let mut asset = dubbing_orchestrator_domain::entities::Asset::new(None, Some(lang("en")));
    asset.set_storage_key(ROLE_RAW, "raw/abc/demo.wav");
    let asset = assets.create(asset).await?;

    let coordinator = PipelineCoordinator::new(
        jobs.clone(),
        assets.clone(),
        segments.clone(),
        artifact_store.clone(),
        broker.clone(),
        Arc::new(StubAsrWorker),
        Arc::new(StubTranslateWorker),
        Arc::new(StubTtsWorker),
        Arc::new(StubMixWorker { vocal_separation: false }),
        Arc::new(FsPackageWorker::new(data_dir.path().join("pub"))),
        metrics,
        RetryPolicy::default(),
        "pipeline",
        data_dir.path(),
    );

    let create_job = CreateTranslationJobUseCase::new(jobs.clone(), assets.clone(), broker.clone(), vec![lang("en"), lang("es")], 0, "pipeline");
    let job = create_job
        .execute(asset.external_id, vec![lang("es")], Default::default(), None, RequesterId::anonymous())
        .await?;

    drain(&coordinator, &broker, "pipeline", Duration::from_secs(5)).await;

    let finished = jobs.get_by_external_id(job.external_id).await?.expect("job exists");
    assert_eq!(finished.status, JobStatus::Success, "job should finish successfully: {finished:#?}");
    assert_eq!(finished.stage, Stage::Done);
    assert_eq!(finished.progress, 1.0);

    for stage in [Stage::Asr, Stage::Translate, Stage::Tts, Stage::AlignMix, Stage::Package] {
        let entry = finished.stage_history.get(&stage).unwrap_or_else(|| panic!("missing stage history for {stage}"));
        assert_eq!(
            entry.status,
            dubbing_orchestrator_domain::value_objects::StageOutcome::Success,
            "stage {stage} did not succeed: {entry:?}"
        );
    }

    let asset_ext = asset.external_id.to_string();
    assert!(artifact_store.has_asr(&asset_ext));
    assert!(artifact_store.missing_translations(&asset_ext, &[lang("es")]).is_empty());
    assert!(artifact_store.missing_tts(&asset_ext, &[lang("es")]).is_empty());
    assert!(artifact_store.missing_mixes(&asset_ext, &[lang("es")]).is_empty());

    let published = assets.get_by_external_id(asset.external_id).await?.expect("asset exists");
    assert!(published.has_public(&lang("es")));
    assert!(data_dir.path().join("pub").join(&asset_ext).join("es/dubbed.wav").is_file());
    assert!(data_dir.path().join("pub").join(&asset_ext).join("master.m3u8").is_file());

    let persisted_segments = segments.list_by_asset(asset.external_id).await?;
    assert!(!persisted_segments.is_empty(), "ASR should have persisted segments relationally");
    for segment in &persisted_segments {
        assert!(segment.text_tgt.is_some(), "translate stage should have filled text_tgt: {segment:?}");
        assert!(segment.synth_key.is_some(), "tts stage should have filled synth_key: {segment:?}");
    }

    Ok(())
}

#[tokio::test]
async fn cancelling_a_job_before_its_first_stage_skips_every_remaining_stage() -> Result<(), OrchestratorError> {
    let db_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite://{}", db_file.path().display());
    let pool = initialize_database(&db_url).await.map_err(|e| OrchestratorError::repository(e.to_string()))?;

    let data_dir = tempfile::tempdir().unwrap();
    let raw_path = data_dir.path().join("raw/abc/demo.wav");
    tokio::fs::create_dir_all(raw_path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&raw_path, vec![7u8; 4_096]).await.unwrap();

    let assets = Arc::new(SqliteAssetRepository::new(pool.clone()));
    let jobs = Arc::new(SqliteJobRepository::new(pool.clone()));
    let segments = Arc::new(SqliteSegmentRepository::new(pool));
    let artifact_store = Arc::new(ArtifactStore::new(data_dir.path().join("proc")));
    let broker = Arc::new(InProcessTaskBroker::new());
    let metrics = MetricsService::new()?;

    let mut asset = dubbing_orchestrator_domain::entities::Asset::new(None, None);
    asset.set_storage_key(ROLE_RAW, "raw/abc/demo.wav");
    let asset = assets.create(asset).await?;

    let coordinator = PipelineCoordinator::new(
        jobs.clone(),
        assets.clone(),
        segments,
        artifact_store,
        broker.clone(),
        Arc::new(StubAsrWorker),
        Arc::new(StubTranslateWorker),
        Arc::new(StubTtsWorker),
        Arc::new(StubMixWorker { vocal_separation: false }),
        Arc::new(FsPackageWorker::new(data_dir.path().join("pub"))),
        metrics,
        RetryPolicy::default(),
        "pipeline",
        data_dir.path(),
    );

    let create_job = CreateTranslationJobUseCase::new(jobs.clone(), assets.clone(), broker.clone(), vec![lang("es")], 0, "pipeline");
    let job = create_job
        .execute(asset.external_id, vec![lang("es")], Default::default(), None, RequesterId::anonymous())
        .await?;

    jobs.cancel(job.external_id, chrono::Utc::now()).await?;

    drain(&coordinator, &broker, "pipeline", Duration::from_secs(2)).await;

    let finished = jobs.get_by_external_id(job.external_id).await?.expect("job exists");
    assert_eq!(finished.status, JobStatus::Cancelled);

    // A cancelled job never reaches FinalizeJob, which would overwrite
    // status back to Success; only the stages it actually ran get a
    // Skipped entry recorded against them.
    if let Some(entry) = finished.stage_history.get(&Stage::Asr) {
        assert_eq!(entry.status, dubbing_orchestrator_domain::value_objects::StageOutcome::Skipped);
    }

    Ok(())
}
