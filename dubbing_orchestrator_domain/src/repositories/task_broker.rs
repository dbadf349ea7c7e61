// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Broker Port
//!
//! The domain-facing view of the task queue. The coordinator and
//! stage runner only need to enqueue named tasks with keyword arguments and
//! a target queue; they never see the broker's internal representation
//! (in-process channel, Redis list, ...).
//!
//! [`TaskName`] enumerates the fixed task vocabulary the coordinator drives:
//! one entry task plus one task per runnable stage plus the
//! finalize step. Keeping this a closed enum (rather than a bare `&str`)
//! means a typo in a task name is a compile error, not a silent no-op
//! enqueue.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::error::OrchestratorError;
use crate::value_objects::RetryPolicy;

/// The fixed set of task names the pipeline coordinator enqueues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    RunPipeline,
    RunAsr,
    RunTranslate,
    RunTts,
    RunAlignMix,
    RunPackage,
    FinalizeJob,
}

impl TaskName {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::RunPipeline => "run_pipeline",
            TaskName::RunAsr => "run_asr",
            TaskName::RunTranslate => "run_translate",
            TaskName::RunTts => "run_tts",
            TaskName::RunAlignMix => "run_align_mix",
            TaskName::RunPackage => "run_package",
            TaskName::FinalizeJob => "finalize_job",
        }
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task pulled off the broker for execution: its name, its keyword
/// arguments (decoded from whatever wire form the broker uses), and the
/// retry bookkeeping the handler must thread through on re-enqueue.
#[derive(Debug, Clone)]
pub struct TaskMessage {
    pub task_id: String,
    pub task: TaskName,
    pub kwargs: HashMap<String, JsonValue>,
    pub attempt: u32,
}

#[async_trait]
pub trait TaskBroker: Send + Sync {
    /// Enqueues `task` with `kwargs` onto `queue`, returning an
    /// opaque task id. `queue` partitions throughput;
    /// e.g. CPU-light ASR/Translate calls can share a queue distinct from
    /// the CPU/GPU-heavy TTS/Mix queue.
    async fn enqueue(
        &self,
        task: TaskName,
        kwargs: HashMap<String, JsonValue>,
        queue: &str,
    ) -> Result<String, OrchestratorError>;

    /// Re-enqueues a task that failed with a retryable error, honoring
    /// `policy`'s backoff schedule for the task's next attempt.
    async fn enqueue_retry(
        &self,
        task: TaskName,
        kwargs: HashMap<String, JsonValue>,
        queue: &str,
        attempt: u32,
        policy: &RetryPolicy,
    ) -> Result<String, OrchestratorError>;
}
