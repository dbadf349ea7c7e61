// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic Identifier
//!
//! `GenericId<T>` is a single ULID-backed identifier type parameterized by a
//! zero-sized marker so that `JobId` and `AssetId` are distinct Rust types
//! even though they share an implementation. ULIDs are used (rather than
//! UUIDv4) because they are lexicographically sortable by creation time,
//! which keeps `ORDER BY id` and `ORDER BY created_at` in agreement without
//! an extra index.
//!
//! ## Category marker pattern
//!
//! A marker struct implementing [`IdCategory`] supplies the human-readable
//! prefix used in `Display`/logging output (e.g. `job_01HZY...`). The marker
//! carries no data; it exists purely to make `GenericId<JobMarker>` and
//! `GenericId<AssetMarker>` incompatible at the type level.

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::OrchestratorError;

/// Associates a marker type with the string prefix used when displaying or
/// parsing an external identifier of that category.
pub trait IdCategory {
    /// Short, lowercase prefix, e.g. `"job"` or `"asset"`.
    const PREFIX: &'static str;
}

/// A ULID-backed external identifier, distinguished by category at compile
/// time.
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _marker: PhantomData<T>,
}

impl<T: IdCategory> GenericId<T> {
    /// Generates a new, time-ordered identifier.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _marker: PhantomData,
        }
    }

    /// Wraps an existing ULID, e.g. one loaded from storage.
    pub fn from_ulid(value: Ulid) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    /// Parses the bare ULID portion without the category prefix.
    pub fn parse_bare(s: &str) -> Result<Self, OrchestratorError> {
        let value = Ulid::from_string(s)
            .map_err(|e| OrchestratorError::validation(format!("invalid {} id '{}': {}", T::PREFIX, s, e)))?;
        Ok(Self::from_ulid(value))
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Clone for GenericId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: IdCategory> Copy for GenericId<T> {}

impl<T: IdCategory> PartialEq for GenericId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<T: IdCategory> Eq for GenericId<T> {}

impl<T: IdCategory> Hash for GenericId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> fmt::Debug for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", T::PREFIX, self.value)
    }
}

impl<T: IdCategory> fmt::Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> FromStr for GenericId<T> {
    type Err = OrchestratorError;

    /// Accepts either the bare ULID (`01HZY...`) or the prefixed form
    /// (`job_01HZY...`), so external ids round-trip regardless of which
    /// style a caller logged or stored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = format!("{}_", T::PREFIX);
        let bare = s.strip_prefix(prefix.as_str()).unwrap_or(s);
        Self::parse_bare(bare)
    }
}

impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value.to_string())
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestMarker;
    impl IdCategory for TestMarker {
        const PREFIX: &'static str = "test";
    }
    type TestId = GenericId<TestMarker>;

    #[test]
    fn display_omits_prefix_debug_includes_it() {
        let id = TestId::new();
        assert_eq!(id.to_string(), id.as_ulid().to_string());
        assert!(format!("{:?}", id).starts_with("test_"));
    }

    #[test]
    fn from_str_accepts_bare_and_prefixed_forms() {
        let id = TestId::new();
        let bare = id.to_string();
        let prefixed = format!("test_{}", bare);

        assert_eq!(TestId::from_str(&bare).unwrap(), id);
        assert_eq!(TestId::from_str(&prefixed).unwrap(), id);
    }

    #[test]
    fn rejects_garbage() {
        assert!(TestId::from_str("not-a-ulid").is_err());
    }

    #[test]
    fn serde_round_trips() {
        let id = TestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
