// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Value Object
//!
//! `Stage` is the sum type driving the pipeline coordinator's state machine:
//! `INGESTED, ASR, TRANSLATE, TTS, ALIGN_MIX, PACKAGE, PUBLISHED, DONE`. Each
//! value carries a `stage_order()` used by the skip-on-resume rule
//! (`stage_order(this) < stage_order(resume_from)`), and a `baseline_progress()`
//! used when the Stage Runner transitions a job to RUNNING.
//!
//! `PUBLISHED` is included for data-model completeness (rows written before
//! the orchestrator settled on `DONE` as the sole terminal stage still parse)
//! but the Pipeline Coordinator never assigns it.
//!
//! The wire representation of `ALIGN_MIX` is `"ALIGN/MIX"` (a literal slash),
//! matching the value already persisted by upstream stage workers.

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingested,
    Asr,
    Translate,
    Tts,
    AlignMix,
    Package,
    Published,
    Done,
}

impl Stage {
    /// The full ordered list of stages the coordinator actually runs
    /// (excludes the bookend pseudo-stages `INGESTED` and `DONE`/`PUBLISHED`).
    pub const RUNNABLE: [Stage; 5] = [
        Stage::Asr,
        Stage::Translate,
        Stage::Tts,
        Stage::AlignMix,
        Stage::Package,
    ];

    /// Total order used by the skip-on-resume rule. Strictly increasing
    /// along the pipeline.
    pub fn stage_order(self) -> u32 {
        match self {
            Stage::Ingested => 0,
            Stage::Asr => 1,
            Stage::Translate => 2,
            Stage::Tts => 3,
            Stage::AlignMix => 4,
            Stage::Package => 5,
            Stage::Published => 6,
            Stage::Done => 6,
        }
    }

    /// Fixed baseline progress assigned when the Stage Runner transitions
    /// the job to RUNNING at this stage.
    pub fn baseline_progress(self) -> f64 {
        match self {
            Stage::Ingested => 0.0,
            Stage::Asr => 0.10,
            Stage::Translate => 0.30,
            Stage::Tts => 0.55,
            Stage::AlignMix => 0.75,
            Stage::Package => 0.90,
            Stage::Published | Stage::Done => 1.00,
        }
    }

    /// The stage that follows this one on success.
    /// `None` for `Package` (its successor is the `finalize_job` task, not
    /// another stage) and for the terminal stages.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Ingested => Some(Stage::Asr),
            Stage::Asr => Some(Stage::Translate),
            Stage::Translate => Some(Stage::Tts),
            Stage::Tts => Some(Stage::AlignMix),
            Stage::AlignMix => Some(Stage::Package),
            Stage::Package | Stage::Published | Stage::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Published | Stage::Done)
    }

    /// Parses a `resume_from` value: unknown or absent values resolve to
    /// `ASR`, never to an error.
    pub fn resolve_resume_from(raw: Option<&str>) -> Stage {
        raw.and_then(|s| Stage::from_str(s).ok()).unwrap_or(Stage::Asr)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Ingested => "INGESTED",
            Stage::Asr => "ASR",
            Stage::Translate => "TRANSLATE",
            Stage::Tts => "TTS",
            Stage::AlignMix => "ALIGN/MIX",
            Stage::Package => "PACKAGE",
            Stage::Published => "PUBLISHED",
            Stage::Done => "DONE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Stage {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INGESTED" => Ok(Stage::Ingested),
            "ASR" => Ok(Stage::Asr),
            "TRANSLATE" => Ok(Stage::Translate),
            "TTS" => Ok(Stage::Tts),
            "ALIGN_MIX" | "ALIGN/MIX" | "ALIGNMIX" => Ok(Stage::AlignMix),
            "PACKAGE" => Ok(Stage::Package),
            "PUBLISHED" => Ok(Stage::Published),
            "DONE" => Ok(Stage::Done),
            other => Err(OrchestratorError::validation(format!("unknown stage '{}'", other))),
        }
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Stage::from_str(&raw).map_err(DeError::custom)
    }
}
