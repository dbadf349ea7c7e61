// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Requester Identifier
//!
//! An opaque, hashed client identifier derived from an API key, used for
//! ownership checks (`job.requested_by`) and active-job quota accounting.
//! The orchestrator never sees the raw API key; by the time a value reaches
//! this type it is already the resolved requester handle. The sentinel
//! `"anonymous"` is a valid value and is explicitly exempt from quota
//! enforcement (see the Control API's `create_translation_job` contract).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterId(String);

impl RequesterId {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RequesterId {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_recognized() {
        assert!(RequesterId::anonymous().is_anonymous());
        assert!(RequesterId::default().is_anonymous());
        assert!(!RequesterId::new("client-x").is_anonymous());
    }
}
