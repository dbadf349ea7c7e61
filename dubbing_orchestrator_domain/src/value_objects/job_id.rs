// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Job external identifier.

use super::generic_id::{GenericId, IdCategory};

/// Marker distinguishing job identifiers from other `GenericId` categories.
#[derive(Debug)]
pub struct JobMarker;

impl IdCategory for JobMarker {
    const PREFIX: &'static str = "job";
}

/// A job's external opaque id, exposed to the Control API and persisted as
/// `jobs.external_id`.
pub type JobId = GenericId<JobMarker>;
