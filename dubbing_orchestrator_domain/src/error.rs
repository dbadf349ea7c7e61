// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Types
//!
//! `OrchestratorError` is the single error type returned by domain services,
//! aggregates, and repository ports. It groups the three error families the
//! orchestrator has to reason about: Control API validation failures,
//! stage-execution failures, and infrastructure failures.
//!
//! Application and infrastructure code is free to wrap this in `anyhow::Error`
//! at its own boundaries; the domain crate itself never depends on `anyhow`.

use thiserror::Error;

/// Errors produced by the orchestrator domain.
///
/// Each variant corresponds to a row in the error taxonomy: validation
/// failures surfaced directly to a Control API caller, stage-execution
/// failures that feed the retry engine, and infrastructure failures from
/// repositories, the task broker, the artifact store, or the metrics
/// registry.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A request failed basic validation (bad shape, out-of-range value).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A requested language is not in the configured allowlist.
    #[error("unsupported language requested: {lang}")]
    UnsupportedLanguage { lang: String },

    /// A referenced entity does not exist.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// The operation conflicts with the current state of the entity
    /// (e.g. cancelling an already-succeeded job, or an ownership mismatch).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// A per-requester quota has been exceeded.
    #[error("active job quota exceeded for requester {client_id} (limit {limit})")]
    QuotaExceeded { client_id: String, limit: u32 },

    /// A stage ran but its required upstream artifact was missing. This is
    /// fatal and non-retryable per the stage runner's error policy.
    #[error("stage {stage} is missing a required artifact: {detail}")]
    StagePrerequisiteMissing { stage: String, detail: String },

    /// A stage worker failed. `retryable` mirrors the distinction between
    /// transient failures (network, rate-limit, subprocess) and permanent
    /// ones (corrupt input, unknown stage).
    #[error("stage {stage} worker failed: {message}")]
    WorkerFailed {
        stage: String,
        message: String,
        retryable: bool,
    },

    /// A repository (job store / asset store) operation failed.
    #[error("repository error: {0}")]
    Repository(String),

    /// The task broker could not accept or deliver a task.
    #[error("broker error: {0}")]
    Broker(String),

    /// The artifact store (filesystem/object-store adapter) failed.
    #[error("artifact store error: {0}")]
    ArtifactStore(String),

    /// The metrics registry could not be constructed or updated.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Anything else, generally a programming-logic error or an
    /// unclassified infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OrchestratorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage { lang: lang.into() }
    }

    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { what, id: id.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn quota_exceeded(client_id: impl Into<String>, limit: u32) -> Self {
        Self::QuotaExceeded {
            client_id: client_id.into(),
            limit,
        }
    }

    pub fn stage_prerequisite_missing(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::StagePrerequisiteMissing {
            stage: stage.into(),
            detail: detail.into(),
        }
    }

    pub fn worker_failed(stage: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self::WorkerFailed {
            stage: stage.into(),
            message: message.into(),
            retryable,
        }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository(message.into())
    }

    pub fn broker(message: impl Into<String>) -> Self {
        Self::Broker(message.into())
    }

    pub fn artifact_store(message: impl Into<String>) -> Self {
        Self::ArtifactStore(message.into())
    }

    pub fn metrics_error(message: impl Into<String>) -> Self {
        Self::Metrics(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error should trigger the broker's retry path when it
    /// originates from a stage worker. Non-worker variants are never
    /// retryable from the runner's point of view.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WorkerFailed { retryable, .. } if *retryable)
    }

    /// Maps this error to the HTTP status code an HTTP layer would use,
    /// per the Control API error policy. This crate has no HTTP
    /// dependency; the mapping is exposed as plain numbers so a caller can
    /// translate without this crate knowing about any particular web
    /// framework.
    pub fn status_hint(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnsupportedLanguage { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 403,
            Self::QuotaExceeded { .. } => 429,
            Self::StagePrerequisiteMissing { .. } => 500,
            Self::WorkerFailed { .. } => 500,
            Self::Repository(_) | Self::Broker(_) | Self::ArtifactStore(_) | Self::Metrics(_) | Self::Internal(_) => {
                500
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_hints_follow_the_control_api_policy() {
        assert_eq!(OrchestratorError::unsupported_language("ja").status_hint(), 422);
        assert_eq!(OrchestratorError::not_found("job", "abc").status_hint(), 404);
        assert_eq!(OrchestratorError::quota_exceeded("client-x", 1).status_hint(), 429);
    }

    #[test]
    fn only_retryable_worker_failures_are_retryable() {
        assert!(OrchestratorError::worker_failed("ASR", "timeout", true).is_retryable());
        assert!(!OrchestratorError::worker_failed("ASR", "bad input", false).is_retryable());
        assert!(!OrchestratorError::internal("oops").is_retryable());
    }
}
