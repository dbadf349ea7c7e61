// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`AssetRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

use dubbing_orchestrator_domain::entities::Asset;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::AssetRepository;
use dubbing_orchestrator_domain::value_objects::{AssetId, LanguageCode};

pub struct SqliteAssetRepository {
    pool: SqlitePool,
}

impl SqliteAssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, OrchestratorError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OrchestratorError::repository(format!("corrupt timestamp '{raw}': {e}")))
}

fn col(row: &sqlx::sqlite::SqliteRow, name: &'static str) -> Result<String, OrchestratorError> {
    row.try_get(name)
        .map_err(|e| OrchestratorError::repository(format!("missing or malformed column '{name}': {e}")))
}

fn col_opt(row: &sqlx::sqlite::SqliteRow, name: &'static str) -> Option<String> {
    row.try_get(name).ok()
}

fn row_to_asset(row: sqlx::sqlite::SqliteRow) -> Result<Asset, OrchestratorError> {
    let json_err = |e: serde_json::Error| OrchestratorError::repository(format!("corrupt asset row JSON: {e}"));

    let target_langs: Vec<LanguageCode> = serde_json::from_str(&col(&row, "target_langs")?).map_err(json_err)?;
    let storage_keys: HashMap<String, String> = serde_json::from_str(&col(&row, "storage_keys")?).map_err(json_err)?;

    Ok(Asset {
        row_id: row.try_get::<i64, _>("id").ok(),
        external_id: AssetId::from_str(&col(&row, "external_id")?)?,
        user_id: col_opt(&row, "user_id"),
        src_lang: col_opt(&row, "src_lang").as_deref().map(LanguageCode::new).transpose()?,
        target_langs,
        storage_keys,
        duration_sec: row.try_get("duration_sec").ok(),
        created_at: parse_ts(&col(&row, "created_at")?)?,
        updated_at: parse_ts(&col(&row, "updated_at")?)?,
    })
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn create(&self, asset: Asset) -> Result<Asset, OrchestratorError> {
        let target_langs = serde_json::to_string(&asset.target_langs).map_err(|e| OrchestratorError::repository(e.to_string()))?;
        let storage_keys = serde_json::to_string(&asset.storage_keys).map_err(|e| OrchestratorError::repository(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO assets (external_id, user_id, src_lang, target_langs, storage_keys, duration_sec, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(asset.external_id.to_string())
        .bind(&asset.user_id)
        .bind(asset.src_lang.as_ref().map(LanguageCode::as_str))
        .bind(target_langs)
        .bind(storage_keys)
        .bind(asset.duration_sec)
        .bind(to_rfc3339(asset.created_at))
        .bind(to_rfc3339(asset.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to insert asset: {e}")))?;

        Ok(Asset {
            row_id: Some(result.last_insert_rowid()),
            ..asset
        })
    }

    async fn get_by_external_id(&self, id: AssetId) -> Result<Option<Asset>, OrchestratorError> {
        let row = sqlx::query("SELECT * FROM assets WHERE external_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to fetch asset {id}: {e}")))?;

        row.map(row_to_asset).transpose()
    }

    async fn set_storage_key(&self, id: AssetId, role: &str, key: &str) -> Result<(), OrchestratorError> {
        let existing: String = sqlx::query_scalar("SELECT storage_keys FROM assets WHERE external_id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to read storage_keys for asset {id}: {e}")))?;

        let mut keys: HashMap<String, String> =
            serde_json::from_str(&existing).map_err(|e| OrchestratorError::repository(format!("corrupt storage_keys: {e}")))?;
        keys.insert(role.to_string(), key.to_string());
        let serialized = serde_json::to_string(&keys).map_err(|e| OrchestratorError::repository(e.to_string()))?;

        sqlx::query("UPDATE assets SET storage_keys = ?, updated_at = ? WHERE external_id = ?")
            .bind(serialized)
            .bind(to_rfc3339(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to write storage_keys for asset {id}: {e}")))?;

        Ok(())
    }

    async fn populate_target_langs_if_absent(&self, id: AssetId, langs: &[LanguageCode]) -> Result<(), OrchestratorError> {
        let existing: String = sqlx::query_scalar("SELECT target_langs FROM assets WHERE external_id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to read target_langs for asset {id}: {e}")))?;

        let current: Vec<LanguageCode> =
            serde_json::from_str(&existing).map_err(|e| OrchestratorError::repository(format!("corrupt target_langs: {e}")))?;
        if !current.is_empty() {
            return Ok(());
        }

        let serialized = serde_json::to_string(langs).map_err(|e| OrchestratorError::repository(e.to_string()))?;
        sqlx::query("UPDATE assets SET target_langs = ?, updated_at = ? WHERE external_id = ?")
            .bind(serialized)
            .bind(to_rfc3339(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to write target_langs for asset {id}: {e}")))?;

        Ok(())
    }

    async fn complete_upload(
        &self,
        id: AssetId,
        src_lang: Option<LanguageCode>,
        target_langs: Vec<LanguageCode>,
    ) -> Result<(), OrchestratorError> {
        let serialized = serde_json::to_string(&target_langs).map_err(|e| OrchestratorError::repository(e.to_string()))?;
        sqlx::query("UPDATE assets SET src_lang = ?, target_langs = ?, updated_at = ? WHERE external_id = ?")
            .bind(src_lang.as_ref().map(LanguageCode::as_str))
            .bind(serialized)
            .bind(to_rfc3339(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to complete upload for asset {id}: {e}")))?;

        Ok(())
    }
}
