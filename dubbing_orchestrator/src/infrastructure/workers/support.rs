// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers for the stub stage workers: atomic file writes so a
//! reader never observes a torn artifact while a retry races a prior
//! attempt.

use std::path::Path;

use dubbing_orchestrator_domain::error::OrchestratorError;

/// Writes `bytes` to `path` via a sibling temp file plus rename, creating
/// parent directories as needed.
pub async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), OrchestratorError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OrchestratorError::artifact_store(format!("failed to create {}: {e}", parent.display())))?;
    }
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| OrchestratorError::artifact_store(format!("failed to write {}: {e}", tmp_path.display())))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| OrchestratorError::artifact_store(format!("failed to rename into {}: {e}", path.display())))?;
    Ok(())
}

/// A deterministic placeholder WAV-like payload: a RIFF-ish header
/// followed by a tone whose "frequency" is derived from `seed`, long
/// enough to stand in for real audio without depending on a codec crate.
pub fn placeholder_audio(seed: u64, duration_hint_secs: f64) -> Vec<u8> {
    let sample_count = ((duration_hint_secs.max(0.1)) * 100.0) as usize;
    let mut buf = Vec::with_capacity(12 + sample_count);
    buf.extend_from_slice(b"RIFFSTUB");
    buf.extend_from_slice(&(seed as u32).to_le_bytes());
    for i in 0..sample_count {
        let value = ((seed.wrapping_add(i as u64)) % 251) as u8;
        buf.push(value);
    }
    buf
}
