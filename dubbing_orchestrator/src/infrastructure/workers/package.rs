// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem stand-in for the object-store publish step: copies the
//! dubbed track and a manifest into a `pub` root rather than an S3-style
//! bucket. Good enough to exercise `storage_keys` plumbing end to end.

use async_trait::async_trait;
use std::path::PathBuf;

use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{PackageOutput, PackageWorker};
use dubbing_orchestrator_domain::value_objects::LanguageCode;

pub struct FsPackageWorker {
    pub_root: PathBuf,
}

impl FsPackageWorker {
    pub fn new(pub_root: impl Into<PathBuf>) -> Self {
        Self {
            pub_root: pub_root.into(),
        }
    }
}

#[async_trait]
impl PackageWorker for FsPackageWorker {
    async fn package(&self, asset_external_id: &str, dubbed_path: &PathBuf, target_lang: &LanguageCode) -> Result<PackageOutput, OrchestratorError> {
        let audio_key = format!("pub/{asset_external_id}/{}/dubbed.wav", target_lang.as_str());
        let master_key = format!("pub/{asset_external_id}/master.m3u8");

        let audio_dest = self.pub_root.join(asset_external_id).join(target_lang.as_str()).join("dubbed.wav");
        let bytes = tokio::fs::read(dubbed_path)
            .await
            .map_err(|e| OrchestratorError::worker_failed("PACKAGE", format!("missing dubbed track {}: {e}", dubbed_path.display()), true))?;
        super::support::atomic_write(&audio_dest, &bytes).await?;

        let manifest_path = self.pub_root.join(asset_external_id).join("master.m3u8");
        let manifest = render_manifest(asset_external_id, target_lang, &audio_key);
        super::support::atomic_write(&manifest_path, &manifest).await?;

        Ok(PackageOutput { master_key, audio_key })
    }
}

fn render_manifest(asset_external_id: &str, target_lang: &LanguageCode, audio_object: &str) -> Vec<u8> {
    serde_json::to_vec_pretty(&serde_json::json!({
        "assetId": asset_external_id,
        "language": target_lang.as_str(),
        "audioObject": audio_object,
    }))
    .expect("manifest fields are plain strings and always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[tokio::test]
    async fn package_copies_the_audio_and_writes_a_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let dubbed_path = tmp.path().join("dubbed.wav");
        tokio::fs::write(&dubbed_path, b"stub-audio").await.unwrap();

        let pub_root = tmp.path().join("pub");
        let worker = FsPackageWorker::new(&pub_root);

        let output = worker.package("asset-1", &dubbed_path, &lang("es")).await.unwrap();

        assert_eq!(output.audio_key, "pub/asset-1/es/dubbed.wav");
        assert_eq!(output.master_key, "pub/asset-1/master.m3u8");
        assert!(pub_root.join("asset-1/es/dubbed.wav").is_file());

        let manifest_bytes = tokio::fs::read(pub_root.join("asset-1/master.m3u8")).await.unwrap();
        let manifest: serde_json::Value = serde_json::from_slice(&manifest_bytes).unwrap();
        assert_eq!(manifest["assetId"], "asset-1");
        assert_eq!(manifest["language"], "es");
        assert_eq!(manifest["audioObject"], "pub/asset-1/es/dubbed.wav");
    }
}
