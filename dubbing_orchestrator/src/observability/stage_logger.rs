// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Per-Job JSONL Log Sink
//!
//! `StageLogger` appends one JSON object per line to a job's log file under
//! `<data_dir>/proc/<asset>/logs/<job>.jsonl`, and mirrors the same event to
//! the process-wide `tracing` log. It is explicit, passed-in context rather
//! than a `tracing` layer: its audience (an operator or user inspecting one
//! job) and lifetime (one file per job, not the process) differ from the
//! process-wide structured log `tracing` drives on its own — both still
//! need to see every event, hence emitting to both.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::value_objects::{JobId, Stage};

/// The log-event taxonomy, distinct from [`StageOutcome`](dubbing_orchestrator_domain::value_objects::StageOutcome):
/// the latter is the persisted stage-history vocabulary, this is what an
/// operator tailing a job's log (or `tracing`) actually sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageEvent {
    Start,
    Success,
    Failed,
    Skip,
    Retry,
    Error,
    Warn,
    End,
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageEvent::Start => "START",
            StageEvent::Success => "SUCCESS",
            StageEvent::Failed => "FAILED",
            StageEvent::Skip => "SKIP",
            StageEvent::Retry => "RETRY",
            StageEvent::Error => "ERROR",
            StageEvent::Warn => "WARN",
            StageEvent::End => "END",
        };
        write!(f, "{s}")
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    ts: chrono::DateTime<Utc>,
    job_id: String,
    asset_id: &'a str,
    stage: Option<&'a str>,
    event: StageEvent,
    message: &'a str,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    details: serde_json::Value,
}

/// Appends JSON lines to a single job's log file. Cheap to clone; the
/// underlying file handle is shared and serialized behind a `tokio::Mutex`
/// so concurrent stage writers never interleave partial lines.
#[derive(Clone)]
pub struct StageLogger {
    job_id: JobId,
    asset_id: String,
    path: PathBuf,
    file: Arc<Mutex<std::fs::File>>,
}

impl StageLogger {
    /// Opens (creating parent directories and the file if necessary) the
    /// JSONL log for `job_id`/`asset_id` at `path`.
    pub fn open(job_id: JobId, asset_id: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OrchestratorError::artifact_store(format!("failed to create log directory: {e}")))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| OrchestratorError::artifact_store(format!("failed to open job log {}: {e}", path.display())))?;

        Ok(Self {
            job_id,
            asset_id: asset_id.into(),
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn log(&self, stage: Option<Stage>, event: StageEvent, message: &str, details: serde_json::Value) {
        let stage_str = stage.map(|s| s.to_string());
        self.emit_tracing(event, stage_str.as_deref(), message);

        let line = LogLine {
            ts: Utc::now(),
            job_id: self.job_id.to_string(),
            asset_id: &self.asset_id,
            stage: stage_str.as_deref(),
            event,
            message,
            details,
        };

        let Ok(serialized) = serde_json::to_string(&line) else {
            return;
        };

        let mut file = self.file.lock().await;
        let _ = writeln!(file, "{serialized}");
    }

    fn emit_tracing(&self, event: StageEvent, stage: Option<&str>, message: &str) {
        let job_id = self.job_id.to_string();
        let asset_id = self.asset_id.as_str();
        let stage = stage.unwrap_or("-");
        match event {
            StageEvent::Failed | StageEvent::Error => {
                tracing::error!(%job_id, %asset_id, %stage, %event, %message, "stage event");
            }
            StageEvent::Warn | StageEvent::Retry => {
                tracing::warn!(%job_id, %asset_id, %stage, %event, %message, "stage event");
            }
            StageEvent::Start | StageEvent::Success | StageEvent::Skip | StageEvent::End => {
                tracing::info!(%job_id, %asset_id, %stage, %event, %message, "stage event");
            }
        }
    }

    pub async fn stage_started(&self, stage: Stage) {
        self.log(Some(stage), StageEvent::Start, "stage started", serde_json::Value::Null).await;
    }

    pub async fn stage_succeeded(&self, stage: Stage, details: serde_json::Value) {
        self.log(Some(stage), StageEvent::Success, "stage succeeded", details).await;
    }

    pub async fn stage_failed(&self, stage: Stage, error: &str) {
        self.log(Some(stage), StageEvent::Failed, error, serde_json::Value::Null).await;
    }

    pub async fn stage_skipped(&self, stage: Stage, reason: &str, details: serde_json::Value) {
        self.log(Some(stage), StageEvent::Skip, reason, details).await;
    }

    pub async fn stage_retrying(&self, stage: Stage, next_attempt: u32) {
        self.log(
            Some(stage),
            StageEvent::Retry,
            "stage failed, scheduling retry",
            serde_json::json!({"nextAttempt": next_attempt}),
        )
        .await;
    }

    pub async fn job_ended(&self, details: serde_json::Value) {
        self.log(None, StageEvent::End, "job finished", details).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_appends_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let job_id = JobId::new();
        let path = dir.path().join("job.jsonl");
        let logger = StageLogger::open(job_id, "asset-1", &path).unwrap();

        logger.stage_started(Stage::Asr).await;
        logger
            .stage_succeeded(Stage::Asr, serde_json::json!({"durationMs": 120}))
            .await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).expect("each line is valid JSON");
            assert_eq!(parsed["job_id"], job_id.to_string());
            assert_eq!(parsed["asset_id"], "asset-1");
        }
    }

    #[tokio::test]
    async fn event_field_matches_the_upper_case_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.jsonl");
        let logger = StageLogger::open(JobId::new(), "asset-1", &path).unwrap();

        logger.stage_skipped(Stage::Translate, "resumed past this stage", serde_json::Value::Null).await;
        logger.stage_retrying(Stage::Tts, 2).await;
        logger.job_ended(serde_json::json!({"status": "SUCCESS"})).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let events: Vec<serde_json::Value> = contents.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(events[0]["event"], "SKIP");
        assert_eq!(events[1]["event"], "RETRY");
        assert_eq!(events[2]["event"], "END");
        assert!(events[2]["stage"].is_null());
    }
}
