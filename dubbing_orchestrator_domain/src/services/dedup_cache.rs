// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage-History Metric Dedup Cache
//!
//! A bounded, FIFO-evicting cache of `(job_id, stage, updated_at)` keys. The
//! Observability Plane calls [`DedupCache::mark_stage_event`] before turning
//! a stage-history write into a histogram/counter observation; a duplicate
//! key (the same job, stage, and timestamp observed twice, e.g. because a
//! broker redelivered a task) returns `false` and the caller skips the
//! metric update, so retried deliveries never double-count.
//!
//! This is plain in-memory bookkeeping, not a repository port — the process
//! that owns it wraps it in a `parking_lot::Mutex` for the module-level
//! singleton described in the observability design notes.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::value_objects::{JobId, Stage};

/// The dedup key: a job, a stage, and the timestamp the stage-history write
/// carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageEventKey {
    pub job_id: JobId,
    pub stage: Stage,
    pub updated_at: DateTime<Utc>,
}

impl StageEventKey {
    pub fn new(job_id: JobId, stage: Stage, updated_at: DateTime<Utc>) -> Self {
        Self { job_id, stage, updated_at }
    }
}

/// Default capacity: 5,000 keys, oldest evicted first.
pub const DEFAULT_CAPACITY: usize = 5_000;

pub struct DedupCache {
    capacity: usize,
    order: VecDeque<StageEventKey>,
    seen: HashSet<StageEventKey>,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
            seen: HashSet::with_capacity(capacity.min(1024)),
        }
    }

    /// Records `(job_id, stage, updated_at)`. Returns `true` the first time
    /// a key is seen (the caller should emit a metric observation), `false`
    /// on every subsequent call with the same key.
    pub fn mark_stage_event(&mut self, job_id: JobId, stage: Stage, updated_at: DateTime<Utc>) -> bool {
        let key = StageEventKey::new(job_id, stage, updated_at);
        if !self.seen.insert(key) {
            return false;
        }
        self.order.push_back(key);
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Test-only reset hook; production callers never call this (module
    /// doc).
    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn mark_stage_event_is_idempotent_for_the_same_key() {
        let mut cache = DedupCache::default();
        let job = JobId::new();
        assert!(cache.mark_stage_event(job, Stage::Asr, ts(100)));
        assert!(!cache.mark_stage_event(job, Stage::Asr, ts(100)));
    }

    #[test]
    fn distinct_timestamps_are_distinct_keys() {
        let mut cache = DedupCache::default();
        let job = JobId::new();
        assert!(cache.mark_stage_event(job, Stage::Asr, ts(100)));
        assert!(cache.mark_stage_event(job, Stage::Asr, ts(101)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_oldest_once_over_capacity() {
        let mut cache = DedupCache::new(2);
        let job = JobId::new();
        assert!(cache.mark_stage_event(job, Stage::Asr, ts(1)));
        assert!(cache.mark_stage_event(job, Stage::Translate, ts(2)));
        assert!(cache.mark_stage_event(job, Stage::Tts, ts(3)));
        assert_eq!(cache.len(), 2);
        // the first key was evicted, so it is treated as new again
        assert!(cache.mark_stage_event(job, Stage::Asr, ts(1)));
    }
}
