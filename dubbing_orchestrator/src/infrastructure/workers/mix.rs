// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deterministic stub mix worker. Concatenates the synthesized segment
//! placeholders into a voice track, derives a background bed from the
//! source (or attenuates it, depending on configuration), and writes out
//! the three tracks the contract expects. No real resampling, loudness
//! normalization, or vocal separation happens here.

use async_trait::async_trait;
use std::path::PathBuf;

use dubbing_orchestrator_domain::entities::Segment;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{MixOutput, MixWorker};
use dubbing_orchestrator_domain::value_objects::LanguageCode;

pub struct StubMixWorker {
    pub vocal_separation: bool,
}

#[async_trait]
impl MixWorker for StubMixWorker {
    async fn mix(
        &self,
        segments: &[Segment],
        synth_paths: &[PathBuf],
        output_dir: &PathBuf,
        source_audio_path: Option<&PathBuf>,
        target_lang: &LanguageCode,
    ) -> Result<MixOutput, OrchestratorError> {
        let dir = output_dir.join(target_lang.as_str());

        let mut voice = Vec::new();
        for synth_path in synth_paths {
            let bytes = tokio::fs::read(synth_path)
                .await
                .map_err(|e| OrchestratorError::worker_failed("ALIGN/MIX", format!("missing synth segment {}: {e}", synth_path.display()), true))?;
            voice.extend(bytes);
        }

        let background = match source_audio_path {
            Some(source) => {
                let source_bytes = tokio::fs::read(source).await.map_err(|e| {
                    OrchestratorError::worker_failed("ALIGN/MIX", format!("cannot read source audio {}: {e}", source.display()), true)
                })?;
                attenuate(&source_bytes, if self.vocal_separation { 1 } else { 2 })
            }
            None => vec![0u8; voice.len().max(1)],
        };

        let mut dubbed = voice.clone();
        for (i, sample) in background.iter().enumerate().take(dubbed.len()) {
            dubbed[i] = dubbed[i].wrapping_add(*sample / 4);
        }

        let voice_path = dir.join(format!("voice_{}.wav", target_lang.as_str()));
        let background_path = dir.join(format!("background_{}.wav", target_lang.as_str()));
        let dubbed_path = dir.join("dubbed.wav");

        super::support::atomic_write(&voice_path, &voice).await?;
        super::support::atomic_write(&background_path, &background).await?;
        super::support::atomic_write(&dubbed_path, &dubbed).await?;

        let _ = segments;
        Ok(MixOutput {
            voice_path,
            background_path,
            dubbed_path,
        })
    }
}

fn attenuate(bytes: &[u8], divisor: u8) -> Vec<u8> {
    bytes.iter().map(|b| b / divisor.max(1)).collect()
}
