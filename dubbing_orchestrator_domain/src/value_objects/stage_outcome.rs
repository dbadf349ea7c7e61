// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage history outcomes and entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome recorded for a stage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    Started,
    Success,
    Skipped,
    Retrying,
    Failed,
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageOutcome::Started => "started",
            StageOutcome::Success => "success",
            StageOutcome::Skipped => "skipped",
            StageOutcome::Retrying => "retrying",
            StageOutcome::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One slot of `Job.stage_history`: the most recent outcome for a given
/// stage, with free-form details (language results, durations, retry
/// attempt counters, error messages) and the time it was last written.
///
/// A stage's slot is overwritten on each new attempt; history is not
/// appended within a slot, only across slots (one per stage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    pub status: StageOutcome,
    #[serde(default)]
    pub details: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl StageHistoryEntry {
    pub fn new(status: StageOutcome, details: serde_json::Value, updated_at: DateTime<Utc>) -> Self {
        Self {
            status,
            details,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StageOutcome::Retrying).unwrap(), "\"retrying\"");
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = StageHistoryEntry::new(StageOutcome::Success, json!({"durationMs": 120}), Utc::now());
        let serialized = serde_json::to_string(&entry).unwrap();
        let back: StageHistoryEntry = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back.status, StageOutcome::Success);
        assert_eq!(back.details["durationMs"], 120);
    }
}
