// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deterministic stub TTS worker. Synthesizes a placeholder tone per
//! segment rather than invoking a real voice model, with the tone's
//! "pitch" derived from the resolved voice preset so different speakers
//! are at least distinguishable in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use dubbing_orchestrator_domain::entities::Segment;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::TtsWorker;
use dubbing_orchestrator_domain::value_objects::LanguageCode;

pub struct StubTtsWorker;

#[async_trait]
impl TtsWorker for StubTtsWorker {
    async fn synthesize(
        &self,
        segments: &[Segment],
        output_dir: &PathBuf,
        target_lang: &LanguageCode,
        presets: &HashMap<String, String>,
    ) -> Result<Vec<PathBuf>, OrchestratorError> {
        let dir = output_dir.join(target_lang.as_str());
        let mut paths = Vec::with_capacity(segments.len());

        for segment in segments {
            let preset = segment.resolve_voice_preset(presets);
            let seed = preset_seed(preset);
            let audio = super::support::placeholder_audio(seed, segment.duration());

            let path = dir.join(format!("seg_{:04}.wav", segment.idx));
            super::support::atomic_write(&path, &audio).await?;
            paths.push(path);
        }

        Ok(paths)
    }
}

fn preset_seed(preset: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    preset.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[tokio::test]
    async fn synthesize_writes_one_wav_per_segment_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![Segment::new_asr(0, 0.0, 2.0, "a"), Segment::new_asr(1, 2.0, 4.0, "b")];

        let worker = StubTtsWorker;
        let paths = worker
            .synthesize(&segments, &dir.path().to_path_buf(), &lang("es"), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("seg_0000.wav"));
        assert!(paths[1].ends_with("seg_0001.wav"));
        for path in &paths {
            assert!(path.is_file());
        }
    }
}
