// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Segment Entity
//!
//! An ASR output record, produced by the ASR stage worker and consumed by
//! Translate and downstream stages. Ordering by `idx` is total and
//! dense; this is relied on by the TTS worker (`seg_XXXX.wav` files are
//! written and read back in `idx` order) and the Mix worker (segments are
//! placed at their `t0` in temporal order).

use serde::{Deserialize, Serialize};

use crate::value_objects::LanguageCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub idx: u32,
    pub t0: f64,
    pub t1: f64,
    pub text_src: String,
    pub detected_lang: Option<LanguageCode>,
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub text_tgt: Option<String>,
    #[serde(default)]
    pub synth_key: Option<String>,
}

impl Segment {
    pub fn new_asr(idx: u32, t0: f64, t1: f64, text_src: impl Into<String>) -> Self {
        Self {
            idx,
            t0,
            t1,
            text_src: text_src.into(),
            detected_lang: None,
            speaker_id: None,
            text_tgt: None,
            synth_key: None,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.t1 - self.t0).max(0.0)
    }

    /// Resolves the voice preset for this segment's speaker per the TTS
    /// worker contract: `presets[speaker_id] or presets["default"]
    /// or speaker_id`.
    pub fn resolve_voice_preset<'a>(&'a self, presets: &'a std::collections::HashMap<String, String>) -> &'a str {
        let speaker = self.speaker_id.as_deref().unwrap_or("default");
        presets
            .get(speaker)
            .or_else(|| presets.get("default"))
            .map(String::as_str)
            .unwrap_or(speaker)
    }
}

/// Checks that a segment list is densely and totally ordered by `idx`
/// starting at zero.
pub fn segments_are_densely_ordered(segments: &[Segment]) -> bool {
    segments.iter().enumerate().all(|(i, seg)| seg.idx as usize == i)
}
