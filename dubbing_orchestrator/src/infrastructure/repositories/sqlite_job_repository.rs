// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`JobRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

use dubbing_orchestrator_domain::entities::Job;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{JobPage, JobRepository};
use dubbing_orchestrator_domain::value_objects::{
    AssetId, JobId, JobStatus, LanguageCode, RequesterId, Stage, StageHistoryEntry, StageOutcome,
};

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
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

fn row_to_job(row: sqlx::sqlite::SqliteRow) -> Result<Job, OrchestratorError> {
    let json_err = |e: serde_json::Error| OrchestratorError::repository(format!("corrupt job row JSON: {e}"));

    let target_langs: Vec<LanguageCode> = serde_json::from_str(&col(&row, "target_langs")?).map_err(json_err)?;
    let presets: HashMap<String, String> = serde_json::from_str(&col(&row, "presets")?).map_err(json_err)?;
    let stage_history: HashMap<Stage, StageHistoryEntry> = serde_json::from_str(&col(&row, "stage_history")?).map_err(json_err)?;

    Ok(Job {
        row_id: row.try_get::<i64, _>("id").ok(),
        external_id: JobId::from_str(&col(&row, "external_id")?)?,
        asset_id: AssetId::from_str(&col(&row, "asset_id")?)?,
        stage: Stage::from_str(&col(&row, "stage")?)?,
        status: JobStatus::from_str(&col(&row, "status")?)?,
        progress: row.try_get::<f64, _>("progress").map_err(|e| OrchestratorError::repository(e.to_string()))?,
        target_langs,
        presets,
        requested_by: col_opt(&row, "requested_by").filter(|s| !s.is_empty()).map(RequesterId::new),
        started_at: col_opt(&row, "started_at").as_deref().map(parse_ts).transpose()?,
        ended_at: col_opt(&row, "ended_at").as_deref().map(parse_ts).transpose()?,
        failed_stage: col_opt(&row, "failed_stage").as_deref().map(Stage::from_str).transpose()?,
        error_message: col_opt(&row, "error_message"),
        logs_key: col_opt(&row, "logs_key"),
        stage_history,
        created_at: parse_ts(&col(&row, "created_at")?)?,
        updated_at: parse_ts(&col(&row, "updated_at")?)?,
    })
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn create(&self, job: Job) -> Result<Job, OrchestratorError> {
        let target_langs = serde_json::to_string(&job.target_langs).map_err(|e| OrchestratorError::repository(e.to_string()))?;
        let presets = serde_json::to_string(&job.presets).map_err(|e| OrchestratorError::repository(e.to_string()))?;
        let stage_history = serde_json::to_string(&job.stage_history).map_err(|e| OrchestratorError::repository(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO jobs (external_id, asset_id, stage, status, progress, target_langs, presets, \
             requested_by, stage_history, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.external_id.to_string())
        .bind(job.asset_id.to_string())
        .bind(job.stage.to_string())
        .bind(job.status.to_string())
        .bind(job.progress)
        .bind(target_langs)
        .bind(presets)
        .bind(job.requested_by.as_ref().map(|r| r.as_str().to_string()))
        .bind(stage_history)
        .bind(to_rfc3339(job.created_at))
        .bind(to_rfc3339(job.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to insert job: {e}")))?;

        Ok(Job {
            row_id: Some(result.last_insert_rowid()),
            ..job
        })
    }

    async fn get_by_external_id(&self, id: JobId) -> Result<Option<Job>, OrchestratorError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE external_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to fetch job {id}: {e}")))?;

        row.map(row_to_job).transpose()
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<JobPage, OrchestratorError> {
        let page = page.max(1);
        let offset = (page - 1) as i64 * page_size as i64;

        let rows = sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(page_size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to list jobs: {e}")))?;

        let items = rows.into_iter().map(row_to_job).collect::<Result<Vec<_>, _>>()?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to count jobs: {e}")))?;

        Ok(JobPage {
            items,
            total: total as u64,
            page,
            page_size,
        })
    }

    async fn count_by_status(&self) -> Result<HashMap<JobStatus, u64>, OrchestratorError> {
        let rows = sqlx::query("SELECT status, COUNT(*) as n FROM jobs GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to count jobs by status: {e}")))?;

        let mut counts = HashMap::new();
        for row in rows {
            let status_raw: String = row.try_get("status").map_err(|e| OrchestratorError::repository(e.to_string()))?;
            let n: i64 = row.try_get("n").map_err(|e| OrchestratorError::repository(e.to_string()))?;
            counts.insert(JobStatus::from_str(&status_raw)?, n as u64);
        }
        Ok(counts)
    }

    async fn count_running_by_stage(&self) -> Result<HashMap<Stage, u64>, OrchestratorError> {
        let rows = sqlx::query("SELECT stage, COUNT(*) as n FROM jobs WHERE status = ? GROUP BY stage")
            .bind(JobStatus::Running.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to count running jobs by stage: {e}")))?;

        let mut counts = HashMap::new();
        for row in rows {
            let stage_raw: String = row.try_get("stage").map_err(|e| OrchestratorError::repository(e.to_string()))?;
            let n: i64 = row.try_get("n").map_err(|e| OrchestratorError::repository(e.to_string()))?;
            counts.insert(Stage::from_str(&stage_raw)?, n as u64);
        }
        Ok(counts)
    }

    async fn fetch_recent(&self, limit: u32) -> Result<Vec<Job>, OrchestratorError> {
        let rows = sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to fetch recent jobs: {e}")))?;

        rows.into_iter().map(row_to_job).collect()
    }

    async fn update_stage(
        &self,
        job_id: JobId,
        stage: Stage,
        status: JobStatus,
        progress: f64,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OrchestratorError> {
        let ended_at = status.is_terminal().then(|| to_rfc3339(now));
        let started_clause = if status == JobStatus::Running {
            "started_at = COALESCE(started_at, ?3),"
        } else {
            ""
        };
        let failed_stage = (status == JobStatus::Failed).then(|| stage.to_string());
        let query = format!(
            "UPDATE jobs SET stage = ?1, status = ?2, {started_clause} progress = ?4, error_message = ?5, \
             ended_at = COALESCE(?6, ended_at), failed_stage = COALESCE(?8, failed_stage), updated_at = ?3 WHERE external_id = ?7"
        );

        sqlx::query(&query)
            .bind(stage.to_string())
            .bind(status.to_string())
            .bind(to_rfc3339(now))
            .bind(progress)
            .bind(error)
            .bind(ended_at)
            .bind(job_id.to_string())
            .bind(failed_stage)
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to update stage for job {job_id}: {e}")))?;

        Ok(())
    }

    async fn record_stage_history(
        &self,
        job_id: JobId,
        stage: Stage,
        outcome: StageOutcome,
        details: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<(), OrchestratorError> {
        let existing: String = sqlx::query_scalar("SELECT stage_history FROM jobs WHERE external_id = ?")
            .bind(job_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to read stage_history for job {job_id}: {e}")))?;

        let mut history: HashMap<Stage, StageHistoryEntry> =
            serde_json::from_str(&existing).map_err(|e| OrchestratorError::repository(format!("corrupt stage_history: {e}")))?;
        history.insert(stage, StageHistoryEntry::new(outcome, details, now));
        let serialized = serde_json::to_string(&history).map_err(|e| OrchestratorError::repository(e.to_string()))?;

        sqlx::query("UPDATE jobs SET stage_history = ?, updated_at = ? WHERE external_id = ?")
            .bind(serialized)
            .bind(to_rfc3339(now))
            .bind(job_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to write stage_history for job {job_id}: {e}")))?;

        Ok(())
    }

    async fn update_logs_key(&self, job_id: JobId, key: Option<String>, now: DateTime<Utc>) -> Result<(), OrchestratorError> {
        sqlx::query("UPDATE jobs SET logs_key = ?, updated_at = ? WHERE external_id = ?")
            .bind(key)
            .bind(to_rfc3339(now))
            .bind(job_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| OrchestratorError::repository(format!("failed to update logs_key for job {job_id}: {e}")))?;
        Ok(())
    }

    async fn reset_for_retry(&self, job_id: JobId, resume_stage: Stage, now: DateTime<Utc>) -> Result<(), OrchestratorError> {
        sqlx::query(
            "UPDATE jobs SET stage = ?, status = ?, progress = 0.0, failed_stage = NULL, \
             error_message = NULL, started_at = NULL, ended_at = NULL, updated_at = ? WHERE external_id = ?",
        )
        .bind(resume_stage.to_string())
        .bind(JobStatus::Pending.to_string())
        .bind(to_rfc3339(now))
        .bind(job_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to reset job {job_id} for retry: {e}")))?;
        Ok(())
    }

    async fn cancel(&self, job_id: JobId, now: DateTime<Utc>) -> Result<(), OrchestratorError> {
        sqlx::query(
            "UPDATE jobs SET status = ?, failed_stage = stage, progress = 1.0, ended_at = ?, updated_at = ? \
             WHERE external_id = ?",
        )
        .bind(JobStatus::Cancelled.to_string())
        .bind(to_rfc3339(now))
        .bind(to_rfc3339(now))
        .bind(job_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to cancel job {job_id}: {e}")))?;
        Ok(())
    }

    async fn count_active_for_requester(&self, client_id: &RequesterId) -> Result<u64, OrchestratorError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE requested_by = ? AND status IN (?, ?)",
        )
        .bind(client_id.as_str())
        .bind(JobStatus::Pending.to_string())
        .bind(JobStatus::Running.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to count active jobs for {client_id}: {e}")))?;

        Ok(count as u64)
    }
}
