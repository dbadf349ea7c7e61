// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Deterministic stub translate worker. Not a real MT engine: it tags
//! each source line with the target language so the pipeline's data flow
//! is exercisable without a network dependency, then applies any
//! supplied glossary as a literal substitution pass.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use dubbing_orchestrator_domain::entities::Segment;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::TranslateWorker;
use dubbing_orchestrator_domain::value_objects::LanguageCode;

pub struct StubTranslateWorker;

#[async_trait]
impl TranslateWorker for StubTranslateWorker {
    async fn translate(
        &self,
        segments: &[Segment],
        output_dir: &PathBuf,
        target_lang: &LanguageCode,
        glossary: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Segment>, OrchestratorError> {
        let translated: Vec<Segment> = segments
            .iter()
            .cloned()
            .map(|mut segment| {
                let mut text = format!("[{}] {}", target_lang.as_str(), segment.text_src);
                if let Some(glossary) = glossary {
                    for (term, forced) in glossary {
                        text = text.replace(term, forced);
                    }
                }
                segment.text_tgt = Some(text);
                segment.detected_lang = Some(target_lang.clone());
                segment
            })
            .collect();

        let path = output_dir.join(format!("segments_tgt.{}.json", target_lang.as_str()));
        let bytes = serde_json::to_vec_pretty(&translated)
            .map_err(|e| OrchestratorError::worker_failed("TRANSLATE", e.to_string(), false))?;
        super::support::atomic_write(&path, &bytes).await?;

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[tokio::test]
    async fn translate_tags_each_segment_and_applies_the_glossary() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![Segment::new_asr(0, 0.0, 4.0, "hello world")];
        let mut glossary = HashMap::new();
        glossary.insert("world".to_string(), "mundo".to_string());

        let worker = StubTranslateWorker;
        let out = worker
            .translate(&segments, &dir.path().to_path_buf(), &lang("es"), Some(&glossary))
            .await
            .unwrap();

        assert_eq!(out[0].text_tgt.as_deref(), Some("[es] hello mundo"));
        assert!(dir.path().join("segments_tgt.es.json").is_file());
    }
}
