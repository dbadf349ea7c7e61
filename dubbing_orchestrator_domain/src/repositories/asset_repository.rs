// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Asset Repository Port
//!
//! Durable state for assets. Narrower than [`JobRepository`] because the
//! orchestrator's own responsibility toward assets is limited: read an
//! asset to resolve languages and check readiness, and extend
//! `storage_keys` as stages (chiefly PACKAGE) and the upload flow
//! publish new object keys.
//!
//! [`JobRepository`]: super::job_repository::JobRepository

use async_trait::async_trait;

use crate::entities::Asset;
use crate::error::OrchestratorError;
use crate::value_objects::{AssetId, LanguageCode};

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn create(&self, asset: Asset) -> Result<Asset, OrchestratorError>;

    async fn get_by_external_id(&self, id: AssetId) -> Result<Option<Asset>, OrchestratorError>;

    /// Sets a storage key (`raw`, `public`, `public_<lang>`, ...) via
    /// read-modify-write in a short transaction.
    async fn set_storage_key(&self, id: AssetId, role: &str, key: &str) -> Result<(), OrchestratorError>;

    /// Populates `target_langs` only if currently empty.
    async fn populate_target_langs_if_absent(&self, id: AssetId, langs: &[LanguageCode]) -> Result<(), OrchestratorError>;

    /// Finalizes an upload: stores source language and target languages
    ///.
    async fn complete_upload(
        &self,
        id: AssetId,
        src_lang: Option<LanguageCode>,
        target_langs: Vec<LanguageCode>,
    ) -> Result<(), OrchestratorError>;
}
