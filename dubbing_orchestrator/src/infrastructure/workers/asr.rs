// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deterministic stub ASR worker: not a real recognizer, but a stand-in
//! that turns a source audio file into a fixed-cadence transcript so the
//! pipeline is runnable end to end without a model.

use async_trait::async_trait;
use std::path::PathBuf;

use dubbing_orchestrator_domain::entities::Segment;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{AsrWorker, DiarizationSegment};

/// Length, in seconds, of each stub transcript segment.
const SEGMENT_SECONDS: f64 = 4.0;

pub struct StubAsrWorker;

#[async_trait]
impl AsrWorker for StubAsrWorker {
    async fn transcribe(
        &self,
        source_audio_path: &PathBuf,
        output_dir: &PathBuf,
        diarization: Option<&[DiarizationSegment]>,
    ) -> Result<Vec<Segment>, OrchestratorError> {
        let metadata = tokio::fs::metadata(source_audio_path).await.map_err(|e| {
            OrchestratorError::worker_failed("ASR", format!("cannot read source audio {}: {e}", source_audio_path.display()), true)
        })?;

        let segment_count = (metadata.len() / 4096).clamp(1, 64) as u32;
        let mut segments = Vec::with_capacity(segment_count as usize);

        for idx in 0..segment_count {
            let t0 = idx as f64 * SEGMENT_SECONDS;
            let t1 = t0 + SEGMENT_SECONDS;
            let mut segment = Segment::new_asr(idx, t0, t1, format!("stub transcript segment {idx}"));
            segment.speaker_id = Some(speaker_for(diarization, t0));
            segments.push(segment);
        }

        let path = output_dir.join("segments_src.json");
        let bytes =
            serde_json::to_vec_pretty(&segments).map_err(|e| OrchestratorError::worker_failed("ASR", e.to_string(), false))?;
        super::support::atomic_write(&path, &bytes).await?;

        Ok(segments)
    }
}

fn speaker_for(diarization: Option<&[DiarizationSegment]>, t0: f64) -> String {
    diarization
        .and_then(|segments| segments.iter().find(|d| t0 >= d.t0 && t0 < d.t1))
        .map(|d| d.speaker_id.clone())
        .unwrap_or_else(|| "speaker-0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transcribe_writes_segments_and_honors_diarization() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("source.wav");
        tokio::fs::write(&audio_path, vec![0u8; 9000]).await.unwrap();

        let worker = StubAsrWorker;
        let diarization = vec![DiarizationSegment {
            t0: 0.0,
            t1: 100.0,
            speaker_id: "host".to_string(),
        }];

        let segments = worker
            .transcribe(&audio_path, &dir.path().to_path_buf(), Some(&diarization))
            .await
            .unwrap();

        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| s.speaker_id.as_deref() == Some("host")));
        assert!(dir.path().join("segments_src.json").is_file());
    }
}
