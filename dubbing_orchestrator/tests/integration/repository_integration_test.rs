//! Exercises the `sqlx`-backed repositories against a real SQLite database
//! in a temporary file, rather than the in-memory fakes the use-case unit
//! tests use.

use std::collections::HashMap;

use chrono::Utc;
use tempfile::NamedTempFile;

use dubbing_orchestrator::infrastructure::repositories::{initialize_database, SqliteAssetRepository, SqliteJobRepository};
use dubbing_orchestrator_domain::entities::{Asset, Job, ROLE_RAW};
use dubbing_orchestrator_domain::repositories::{AssetRepository, JobRepository};
use dubbing_orchestrator_domain::value_objects::{JobStatus, LanguageCode, RequesterId, Stage, StageOutcome};

async fn test_pool() -> (NamedTempFile, sqlx::SqlitePool) {
    let file = NamedTempFile::new().expect("temp db file");
    let url = format!("sqlite://{}", file.path().display());
    let pool = initialize_database(&url).await.expect("schema bootstrap");
    (file, pool)
}

fn lang(s: &str) -> LanguageCode {
    LanguageCode::new(s).expect("valid language code")
}

#[tokio::test]
async fn asset_round_trips_through_sqlite_with_a_raw_storage_key() {
    let (_file, pool) = test_pool().await;
    let assets = SqliteAssetRepository::new(pool);

    let mut asset = Asset::new(Some("user-1".to_string()), Some(lang("en")));
    asset.set_storage_key(ROLE_RAW, "raw/abc/demo.wav");
    let created = assets.create(asset.clone()).await.unwrap();
    assert!(created.row_id.is_some());

    let fetched = assets.get_by_external_id(created.external_id).await.unwrap().expect("asset exists");
    assert_eq!(fetched.storage_key(ROLE_RAW), Some("raw/abc/demo.wav"));
    assert_eq!(fetched.user_id.as_deref(), Some("user-1"));

    assets.populate_target_langs_if_absent(created.external_id, &[lang("es"), lang("fr")]).await.unwrap();
    let with_langs = assets.get_by_external_id(created.external_id).await.unwrap().unwrap();
    assert_eq!(with_langs.target_langs, vec![lang("es"), lang("fr")]);

    // populate_target_langs_if_absent is a no-op once target_langs is non-empty.
    assets.populate_target_langs_if_absent(created.external_id, &[lang("de")]).await.unwrap();
    let unchanged = assets.get_by_external_id(created.external_id).await.unwrap().unwrap();
    assert_eq!(unchanged.target_langs, vec![lang("es"), lang("fr")]);
}

#[tokio::test]
async fn job_lifecycle_persists_stage_transitions_and_history() {
    let (_file, pool) = test_pool().await;
    let assets = SqliteAssetRepository::new(pool.clone());
    let jobs = SqliteJobRepository::new(pool);

    let asset = assets.create(Asset::new(None, None)).await.unwrap();
    let job = Job::new(asset.external_id, vec![lang("es")], HashMap::new(), Some(RequesterId::new("client-1")));
    let created = jobs.create(job).await.unwrap();
    assert_eq!(created.status, JobStatus::Pending);

    let now = Utc::now();
    jobs.update_stage(created.external_id, Stage::Asr, JobStatus::Running, Stage::Asr.baseline_progress(), None, now)
        .await
        .unwrap();
    jobs.record_stage_history(created.external_id, Stage::Asr, StageOutcome::Success, serde_json::json!({"segments": 3}), now)
        .await
        .unwrap();

    let running = jobs.get_by_external_id(created.external_id).await.unwrap().unwrap();
    assert_eq!(running.status, JobStatus::Running);
    assert_eq!(running.stage, Stage::Asr);
    assert_eq!(running.stage_history.get(&Stage::Asr).map(|e| e.status), Some(StageOutcome::Success));

    jobs.cancel(created.external_id, Utc::now()).await.unwrap();
    let cancelled = jobs.get_by_external_id(created.external_id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    let active = jobs.count_active_for_requester(&RequesterId::new("client-1")).await.unwrap();
    assert_eq!(active, 0, "a cancelled job is no longer active");
}

#[tokio::test]
async fn list_and_count_reflect_created_jobs() {
    let (_file, pool) = test_pool().await;
    let assets = SqliteAssetRepository::new(pool.clone());
    let jobs = SqliteJobRepository::new(pool);

    let asset = assets.create(Asset::new(None, None)).await.unwrap();
    for _ in 0..3 {
        jobs.create(Job::new(asset.external_id, vec![lang("es")], HashMap::new(), None)).await.unwrap();
    }

    let page = jobs.list(1, 10).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);

    let by_status = jobs.count_by_status().await.unwrap();
    assert_eq!(by_status.get(&JobStatus::Pending), Some(&3));
}
