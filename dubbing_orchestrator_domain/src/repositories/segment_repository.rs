// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Segment Repository Port
//!
//! Relational mirror of the per-asset ASR transcript. `ArtifactStore`'s
//! `segments_src.json`/`segments_tgt.<lang>.json` files remain each stage
//! worker's actual input/output contract; this repository is populated
//! alongside them so a segment's source text, current translation, and
//! synthesized-audio key are queryable without reading the job's
//! filesystem tree. Keyed by asset, not job: the source transcript and its
//! one live translation belong to the asset, not to any one dubbing job
//! run against it.

use async_trait::async_trait;

use crate::entities::Segment;
use crate::error::OrchestratorError;
use crate::value_objects::AssetId;

#[async_trait]
pub trait SegmentRepository: Send + Sync {
    /// Inserts or replaces the ASR-produced rows for `asset_id`, keyed by
    /// `idx`. Called once the ASR stage has written `segments_src.json`.
    async fn upsert_asr(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError>;

    /// Updates `text_tgt` for each segment present in `segments`, matched
    /// by `idx`. Called once the Translate stage has written
    /// `segments_tgt.<lang>.json`.
    async fn update_translations(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError>;

    /// Updates `synth_key` for each segment present in `segments`, matched
    /// by `idx`. Called once the TTS stage has synthesized its per-segment
    /// audio files.
    async fn update_synth_keys(&self, asset_id: AssetId, segments: &[Segment]) -> Result<(), OrchestratorError>;

    /// All segment rows for `asset_id`, ordered by `idx`.
    async fn list_by_asset(&self, asset_id: AssetId) -> Result<Vec<Segment>, OrchestratorError>;
}
