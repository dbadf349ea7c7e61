// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Retry Policy and Retry State
//!
//! Per the Design Notes, retry policy is a value supplied at task
//! registration, not a decorator or trait impl: `RetryPolicy` bundles
//! `max_attempts`, exponential `base`, a `cap`, and whether to jitter the
//! computed delay. `RetryState` is the explicit, serializable record of how
//! many attempts a specific task invocation has made so far; the broker
//! threads it through re-enqueued tasks rather than relying on any
//! broker-internal retry counter the orchestrator can't observe.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy governing stage-worker retries. The default is `max_retries=3`,
/// exponential backoff capped at 60 seconds, with jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub cap: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base: Duration, cap: Duration, jitter: bool) -> Self {
        Self {
            max_attempts,
            base,
            cap,
            jitter,
        }
    }

    /// Computes the backoff delay before the given 1-based attempt number,
    /// exponential in `base`, capped at `cap`, optionally jittered by up to
    /// 50% to avoid synchronized retry storms.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let scaled = self.base.as_millis().saturating_mul(1u128 << exp);
        let capped = scaled.min(self.cap.as_millis());
        let millis = capped as u64;

        if self.jitter && millis > 0 {
            let jittered = rand::rng().random_range(millis / 2..=millis);
            Duration::from_millis(jittered)
        } else {
            Duration::from_millis(millis)
        }
    }
}

impl Default for RetryPolicy {
    /// `max_retries=3` (i.e. up to 4 attempts total), base 1s, cap 60s,
    /// jitter enabled.
    fn default() -> Self {
        Self::new(4, Duration::from_secs(1), Duration::from_secs(60), true)
    }
}

/// The explicit state of one task's retry history, threaded through
/// re-enqueued broker tasks rather than held implicitly by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState {
    /// Number of attempts made so far, including the one currently running.
    pub attempt: u32,
    pub max_attempts: u32,
}

impl RetryState {
    pub fn first_attempt(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts,
        }
    }

    /// Whether another attempt remains after this one fails.
    pub fn will_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// The state to carry into the next attempt, if any.
    pub fn next(&self) -> Option<Self> {
        self.will_retry().then_some(Self {
            attempt: self.attempt + 1,
            max_attempts: self.max_attempts,
        })
    }
}
