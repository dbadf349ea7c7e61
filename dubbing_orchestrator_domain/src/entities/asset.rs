// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Asset Entity
//!
//! An uploaded source audio and its metadata; the unit of work a [`Job`]
//! operates over. `Asset` exclusively owns its workspace directory and
//! every per-language artifact beneath it; concurrent jobs over the same
//! asset share artifacts via the artifact store's existence-based cache
//! rather than the entity arbitrating access itself.
//!
//! [`Job`]: super::job::Job

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::OrchestratorError;
use crate::value_objects::{AssetId, LanguageCode};

/// Well-known storage roles on [`Asset::storage_keys`].
pub const ROLE_RAW: &str = "raw";
pub const ROLE_PROCESSED: &str = "processed";
pub const ROLE_PUBLIC: &str = "public";

/// Storage role for a language's published output, e.g. `public_es`.
pub fn public_role_for(lang: &LanguageCode) -> String {
    format!("public_{}", lang.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Autoincrement primary key assigned by the job store; `None` before
    /// first persistence.
    pub row_id: Option<i64>,
    pub external_id: AssetId,
    pub user_id: Option<String>,
    pub src_lang: Option<LanguageCode>,
    pub target_langs: Vec<LanguageCode>,
    pub storage_keys: HashMap<String, String>,
    pub duration_sec: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Creates a freshly ingested asset. Called by the upload flow's
    /// `init` operation once the `raw` object key is known, or immediately
    /// before it for assets created without an upload session.
    pub fn new(user_id: Option<String>, src_lang: Option<LanguageCode>) -> Self {
        let now = Utc::now();
        Self {
            row_id: None,
            external_id: AssetId::new(),
            user_id,
            src_lang,
            target_langs: Vec::new(),
            storage_keys: HashMap::new(),
            duration_sec: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn storage_key(&self, role: &str) -> Option<&str> {
        self.storage_keys.get(role).map(String::as_str)
    }

    pub fn has_raw(&self) -> bool {
        self.storage_keys.contains_key(ROLE_RAW)
    }

    pub fn has_public(&self, lang: &LanguageCode) -> bool {
        self.storage_keys.contains_key(&public_role_for(lang))
    }

    /// Sets a storage key and bumps `updated_at`. Used by the upload flow
    /// (`raw`) and by the Package stage coordinator (`public`, `public_<lang>`).
    pub fn set_storage_key(&mut self, role: impl Into<String>, key: impl Into<String>) {
        self.storage_keys.insert(role.into(), key.into());
        self.updated_at = Utc::now();
    }

    /// Populates `target_langs` from the given list only if the asset does
    /// not already have one set.
    pub fn populate_target_langs_if_absent(&mut self, langs: &[LanguageCode]) {
        if self.target_langs.is_empty() {
            self.target_langs = langs.to_vec();
            self.updated_at = Utc::now();
        }
    }

    /// Enforces that every `lang` is present in `allowlist`. Returns the
    /// first offending language in an error, matching the Control API's
    /// 422 message format.
    pub fn validate_languages_allowed(langs: &[LanguageCode], allowlist: &[LanguageCode]) -> Result<(), OrchestratorError> {
        for lang in langs {
            if !allowlist.contains(lang) {
                return Err(OrchestratorError::unsupported_language(lang.as_str()));
            }
        }
        Ok(())
    }

    /// A job may not leave `INGESTED` until the asset's `raw` key is set.
    pub fn ready_for_pipeline(&self) -> bool {
        self.has_raw()
    }
}
