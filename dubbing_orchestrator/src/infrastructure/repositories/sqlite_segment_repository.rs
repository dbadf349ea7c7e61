// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`SegmentRepository`].

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use dubbing_orchestrator_domain::entities::Segment;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::SegmentRepository;
use dubbing_orchestrator_domain::value_objects::{AssetId, LanguageCode};

pub struct SqliteSegmentRepository {
    pool: SqlitePool,
}

impl SqliteSegmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_segment(row: sqlx::sqlite::SqliteRow) -> Result<Segment, OrchestratorError> {
    let err = |e: sqlx::Error| OrchestratorError::repository(format!("malformed segment row: {e}"));

    let detected_lang: Option<String> = row.try_get("detected_lang").map_err(err)?;

    Ok(Segment {
        idx: row.try_get::<i64, _>("idx").map_err(err)? as u32,
        t0: row.try_get("t0").map_err(err)?,
        t1: row.try_get("t1").map_err(err)?,
        text_src: row.try_get("text_src").map_err(err)?,
        detected_lang: detected_lang.map(LanguageCode::new).transpose()?,
        speaker_id: row.try_get("speaker_id").map_err(err)?,
        text_tgt: row.try_get("text_tgt").map_err(err)?,
        synth_key: row.try_get("synth_key").map_err(err)?,
    })
}

#[async_trait]
impl SegmentRepository for SqliteSegmentRepository {
    async fn upsert_asr(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to start segment upsert transaction: {e}")))?;

        for segment in segments {
            sqlx::query(
                "INSERT INTO segments (asset_id, idx, t0, t1, text_src, detected_lang, speaker_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (asset_id, idx) DO UPDATE SET \
                 t0 = excluded.t0, t1 = excluded.t1, text_src = excluded.text_src, \
                 detected_lang = excluded.detected_lang, speaker_id = excluded.speaker_id",
            )
            .bind(asset_id.to_string())
            .bind(segment.idx as i64)
            .bind(segment.t0)
            .bind(segment.t1)
            .bind(&segment.text_src)
            .bind(segment.detected_lang.as_ref().map(LanguageCode::as_str))
            .bind(segment.speaker_id.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to upsert segment {} for asset {asset_id}: {e}", segment.idx)))?;
        }

        tx.commit()
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to commit segment upsert for asset {asset_id}: {e}")))?;
        Ok(())
    }

    async fn update_translations(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError> {
        for segment in segments {
            sqlx::query("UPDATE segments SET text_tgt = ? WHERE asset_id = ? AND idx = ?")
                .bind(&segment.text_tgt)
                .bind(asset_id.to_string())
                .bind(segment.idx as i64)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    OrchestratorError::repository(format!("failed to update translation for segment {} of asset {asset_id}: {e}", segment.idx))
                })?;
        }
        Ok(())
    }

    async fn update_synth_keys(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError> {
        for segment in segments {
            sqlx::query("UPDATE segments SET synth_key = ? WHERE asset_id = ? AND idx = ?")
                .bind(&segment.synth_key)
                .bind(asset_id.to_string())
                .bind(segment.idx as i64)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    OrchestratorError::repository(format!("failed to update synth key for segment {} of asset {asset_id}: {e}", segment.idx))
                })?;
        }
        Ok(())
    }

    async fn list_by_asset(&self, asset_id: AssetId) -> Result<Vec<Segment>, OrchestratorError> {
        let rows = sqlx::query("SELECT * FROM segments WHERE asset_id = ? ORDER BY idx ASC")
            .bind(asset_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to list segments for asset {asset_id}: {e}")))?;

        rows.into_iter().map(row_to_segment).collect()
    }
}
