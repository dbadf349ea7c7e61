// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Asset external identifier.

use super::generic_id::{GenericId, IdCategory};

/// Marker distinguishing asset identifiers from other `GenericId` categories.
#[derive(Debug)]
pub struct AssetMarker;

impl IdCategory for AssetMarker {
    const PREFIX: &'static str = "asset";
}

/// An asset's external opaque id; also doubles as the name of its workspace
/// directory (`<proc>/<asset_id>/…`, see the artifact store adapter).
pub type AssetId = GenericId<AssetMarker>;
