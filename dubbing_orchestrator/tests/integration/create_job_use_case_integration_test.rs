//! `CreateTranslationJobUseCase` against real SQLite repositories and the
//! real in-process broker, rather than the fakes its own unit tests use.

use std::sync::Arc;

use tempfile::NamedTempFile;

use dubbing_orchestrator::application::use_cases::CreateTranslationJobUseCase;
use dubbing_orchestrator::infrastructure::repositories::{initialize_database, SqliteAssetRepository, SqliteJobRepository};
use dubbing_orchestrator::infrastructure::InProcessTaskBroker;
use dubbing_orchestrator_domain::entities::{Asset, ROLE_RAW};
use dubbing_orchestrator_domain::repositories::{AssetRepository, TaskBroker, TaskName};
use dubbing_orchestrator_domain::value_objects::{LanguageCode, RequesterId};

fn lang(s: &str) -> LanguageCode {
    LanguageCode::new(s).expect("valid language code")
}

#[tokio::test]
async fn creating_a_job_persists_it_and_enqueues_run_pipeline() {
    let file = NamedTempFile::new().unwrap();
    let url = format!("sqlite://{}", file.path().display());
    let pool = initialize_database(&url).await.unwrap();

    let assets = Arc::new(SqliteAssetRepository::new(pool.clone()));
    let jobs = Arc::new(SqliteJobRepository::new(pool));
    let broker = Arc::new(InProcessTaskBroker::new());

    let mut asset = Asset::new(None, None);
    asset.set_storage_key(ROLE_RAW, "raw/abc/demo.wav");
    let asset = assets.create(asset).await.unwrap();

    let use_case = CreateTranslationJobUseCase::new(
        jobs.clone(),
        assets.clone(),
        broker.clone(),
        vec![lang("en"), lang("es")],
        0,
        "pipeline",
    );

    let created = use_case
        .execute(asset.external_id, vec![lang("es")], Default::default(), None, RequesterId::anonymous())
        .await
        .unwrap();

    assert_eq!(broker.pending_count("pipeline"), 1);
    let message = broker.dequeue("pipeline").await;
    assert_eq!(message.task, TaskName::RunPipeline);
    assert_eq!(message.kwargs.get("job_id").and_then(|v| v.as_str()), Some(created.external_id.to_string().as_str()));
}

#[tokio::test]
async fn creating_a_job_for_an_unknown_asset_fails_without_touching_the_broker() {
    let file = NamedTempFile::new().unwrap();
    let url = format!("sqlite://{}", file.path().display());
    let pool = initialize_database(&url).await.unwrap();

    let assets = Arc::new(SqliteAssetRepository::new(pool.clone()));
    let jobs = Arc::new(SqliteJobRepository::new(pool));
    let broker = Arc::new(InProcessTaskBroker::new());

    let use_case = CreateTranslationJobUseCase::new(jobs, assets, broker.clone(), vec![lang("es")], 0, "pipeline");

    let err = use_case
        .execute(
            dubbing_orchestrator_domain::value_objects::AssetId::new(),
            vec![lang("es")],
            Default::default(),
            None,
            RequesterId::anonymous(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_hint(), 404);
    assert_eq!(broker.pending_count("pipeline"), 0);
}
