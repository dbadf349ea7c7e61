// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Language Code Value Object
//!
//! A validated lowercase language tag (`"en"`, `"es"`, `"pt-br"`, ...). The
//! orchestrator never ships its own list of real-world languages; validity
//! against the configured allowlist is checked by the caller (the Control
//! API use cases), not by this type. This type only guarantees *shape*: a
//! short alphanumeric-with-hyphens tag, normalized to lowercase so it can be
//! used directly in filesystem paths (`<asset>/tts/<lang>/...`) and JSON map
//! keys without further sanitization.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OrchestratorError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a validated language code, normalizing to lowercase.
    ///
    /// # Errors
    /// Returns `OrchestratorError::Validation` if the tag is empty, longer
    /// than 16 characters, or contains anything other than ASCII letters,
    /// digits, or hyphens.
    pub fn new(raw: impl Into<String>) -> Result<Self, OrchestratorError> {
        let raw = raw.into();
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(OrchestratorError::validation("language code cannot be empty"));
        }
        if normalized.len() > 16 {
            return Err(OrchestratorError::validation(format!(
                "language code '{}' is too long",
                raw
            )));
        }
        if !normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(OrchestratorError::validation(format!(
                "language code '{}' contains invalid characters",
                raw
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = OrchestratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}
