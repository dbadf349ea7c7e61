// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Worker Ports
//!
//! One trait per stage worker contract. These are the seams the
//! orchestrator is built against; the actual speech-recognition,
//! translation, synthesis, and mixing engines are out of scope and are
//! realized in infrastructure as either real subprocess/HTTP adapters or, in
//! this crate, deterministic stub implementations that make the pipeline
//! runnable end to end in tests and local development.
//!
//! Every method is async because every implementation does I/O (subprocess
//! invocation, HTTP calls, filesystem writes); the stage runner that calls
//! these traits is itself plain async code, not a CPU-bound domain service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::entities::Segment;
use crate::error::OrchestratorError;
use crate::value_objects::LanguageCode;

/// A speaker-labelled time range, optionally supplied to the ASR worker to
/// seed per-segment speaker attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DiarizationSegment {
    pub t0: f64,
    pub t1: f64,
    pub speaker_id: String,
}

#[async_trait]
pub trait AsrWorker: Send + Sync {
    /// Transcribes `source_audio_path`, writes `segments_src.json` into
    /// `output_dir` atomically, and returns the segments written.
    async fn transcribe(
        &self,
        source_audio_path: &PathBuf,
        output_dir: &PathBuf,
        diarization: Option<&[DiarizationSegment]>,
    ) -> Result<Vec<Segment>, OrchestratorError>;
}

#[async_trait]
pub trait TranslateWorker: Send + Sync {
    /// Translates `segments` into `target_lang`, writes
    /// `segments_tgt.<lang>.json` into `output_dir`, and returns the
    /// translated segments. `glossary` entries force specific source ->
    /// target substitutions.
    async fn translate(
        &self,
        segments: &[Segment],
        output_dir: &PathBuf,
        target_lang: &LanguageCode,
        glossary: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Segment>, OrchestratorError>;
}

#[async_trait]
pub trait TtsWorker: Send + Sync {
    /// Synthesizes one `seg_XXXX.wav` per segment, in `idx` order, into
    /// `output_dir`, resolving a voice per segment via
    /// `Segment::resolve_voice_preset`. Returns the written file paths in
    /// `idx` order.
    async fn synthesize(
        &self,
        segments: &[Segment],
        output_dir: &PathBuf,
        target_lang: &LanguageCode,
        presets: &HashMap<String, String>,
    ) -> Result<Vec<PathBuf>, OrchestratorError>;
}

/// Paths written by [`MixWorker::mix`].
#[derive(Debug, Clone, PartialEq)]
pub struct MixOutput {
    pub voice_path: PathBuf,
    pub background_path: PathBuf,
    pub dubbed_path: PathBuf,
}

#[async_trait]
pub trait MixWorker: Send + Sync {
    /// Assembles the per-language voice track from `synth_paths` at each
    /// segment's `t0`, derives a background bed from `source_audio_path`
    /// (optionally via vocal separation), mixes and loudness-normalizes,
    /// and writes `voice_<lang>.wav`, `background_<lang>.wav`,
    /// `dubbed.wav` into `output_dir`.
    async fn mix(
        &self,
        segments: &[Segment],
        synth_paths: &[PathBuf],
        output_dir: &PathBuf,
        source_audio_path: Option<&PathBuf>,
        target_lang: &LanguageCode,
    ) -> Result<MixOutput, OrchestratorError>;
}

/// Object keys returned by [`PackageWorker::package`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOutput {
    pub master_key: String,
    pub audio_key: String,
}

#[async_trait]
pub trait PackageWorker: Send + Sync {
    /// Uploads `dubbed_path` to `pub/<asset>/<lang>/dubbed.wav`, writes and
    /// uploads a master manifest referencing it to
    /// `pub/<asset>/master.m3u8`.
    async fn package(
        &self,
        asset_external_id: &str,
        dubbed_path: &PathBuf,
        target_lang: &LanguageCode,
    ) -> Result<PackageOutput, OrchestratorError>;
}
