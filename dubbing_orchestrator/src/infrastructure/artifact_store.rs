// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Artifact Store Adapter
//!
//! Deterministic filesystem paths for every stage output, plus existence
//! tests used by skip-on-resume. The adapter only computes paths and
//! answers readiness questions; writing artifacts is each stage worker's
//! job.

use std::path::{Path, PathBuf};

use dubbing_orchestrator_domain::entities::Asset;
use dubbing_orchestrator_domain::value_objects::LanguageCode;

/// Resolves artifact paths under a process-wide `proc` root, one
/// subdirectory per asset.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    proc_root: PathBuf,
}

impl ArtifactStore {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    fn asset_dir(&self, asset_external_id: &str) -> PathBuf {
        self.proc_root.join(asset_external_id)
    }

    pub fn asr_dir(&self, asset_external_id: &str) -> PathBuf {
        self.asset_dir(asset_external_id).join("asr")
    }

    pub fn translations_dir(&self, asset_external_id: &str) -> PathBuf {
        self.asset_dir(asset_external_id).join("translations")
    }

    pub fn tts_root(&self, asset_external_id: &str) -> PathBuf {
        self.asset_dir(asset_external_id).join("tts")
    }

    pub fn mix_root(&self, asset_external_id: &str) -> PathBuf {
        self.asset_dir(asset_external_id).join("mix")
    }

    pub fn asr_segments_path(&self, asset_external_id: &str) -> PathBuf {
        self.asr_dir(asset_external_id).join("segments_src.json")
    }

    pub fn translation_segments_path(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.translations_dir(asset_external_id)
            .join(format!("segments_tgt.{}.json", lang.as_str()))
    }

    pub fn tts_dir(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.tts_root(asset_external_id).join(lang.as_str())
    }

    pub fn tts_segment_path(&self, asset_external_id: &str, lang: &LanguageCode, idx: u32) -> PathBuf {
        self.tts_dir(asset_external_id, lang).join(format!("seg_{:04}.wav", idx))
    }

    pub fn mix_dir(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.mix_root(asset_external_id).join(lang.as_str())
    }

    pub fn voice_track_path(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.mix_dir(asset_external_id, lang).join(format!("voice_{}.wav", lang.as_str()))
    }

    pub fn background_track_path(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.mix_dir(asset_external_id, lang)
            .join(format!("background_{}.wav", lang.as_str()))
    }

    pub fn dubbed_path(&self, asset_external_id: &str, lang: &LanguageCode) -> PathBuf {
        self.mix_dir(asset_external_id, lang).join("dubbed.wav")
    }

    pub fn logs_path(&self, asset_external_id: &str, job_external_id: &str) -> PathBuf {
        self.asset_dir(asset_external_id)
            .join("logs")
            .join(format!("{job_external_id}.jsonl"))
    }

    pub fn has_asr(&self, asset_external_id: &str) -> bool {
        self.asr_segments_path(asset_external_id).is_file()
    }

    /// Returns the subset of `langs` whose translation artifact is absent.
    pub fn missing_translations(&self, asset_external_id: &str, langs: &[LanguageCode]) -> Vec<LanguageCode> {
        langs
            .iter()
            .filter(|lang| !self.translation_segments_path(asset_external_id, lang).is_file())
            .cloned()
            .collect()
    }

    /// Returns the subset of `langs` with no (or empty) TTS output
    /// directory. An empty directory counts as missing.
    pub fn missing_tts(&self, asset_external_id: &str, langs: &[LanguageCode]) -> Vec<LanguageCode> {
        langs
            .iter()
            .filter(|lang| !dir_has_entries(&self.tts_dir(asset_external_id, lang)))
            .cloned()
            .collect()
    }

    pub fn missing_mixes(&self, asset_external_id: &str, langs: &[LanguageCode]) -> Vec<LanguageCode> {
        langs
            .iter()
            .filter(|lang| !self.dubbed_path(asset_external_id, lang).is_file())
            .cloned()
            .collect()
    }

    /// Returns the subset of `langs` not yet published, per the asset's
    /// own `public_<lang>` storage key — the artifact store holds no
    /// opinion on object-store keys beyond asking the asset.
    pub fn missing_packages(&self, asset: &Asset, langs: &[LanguageCode]) -> Vec<LanguageCode> {
        langs.iter().filter(|lang| !asset.has_public(lang)).cloned().collect()
    }
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[test]
    fn asr_is_missing_until_the_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.has_asr("asset-1"));

        let path = store.asr_segments_path("asset-1");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[]").unwrap();
        assert!(store.has_asr("asset-1"));
    }

    #[test]
    fn missing_tts_treats_an_empty_directory_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let es = lang("es");

        assert_eq!(store.missing_tts("asset-1", &[es.clone()]), vec![es.clone()]);

        std::fs::create_dir_all(store.tts_dir("asset-1", &es)).unwrap();
        assert_eq!(
            store.missing_tts("asset-1", &[es.clone()]),
            vec![es.clone()],
            "an empty directory still counts as missing"
        );

        std::fs::write(store.tts_segment_path("asset-1", &es, 0), b"RIFF").unwrap();
        assert!(store.missing_tts("asset-1", &[es]).is_empty());
    }

    #[test]
    fn missing_packages_defers_to_the_asset_public_keys() {
        let mut asset = Asset::new(None, None);
        let es = lang("es");
        assert_eq!(
            ArtifactStore::new(".").missing_packages(&asset, &[es.clone()]),
            vec![es.clone()]
        );

        asset.set_storage_key(dubbing_orchestrator_domain::entities::public_role_for(&es), "pub/a/es/dubbed.wav");
        assert!(ArtifactStore::new(".").missing_packages(&asset, &[es]).is_empty());
    }
}
