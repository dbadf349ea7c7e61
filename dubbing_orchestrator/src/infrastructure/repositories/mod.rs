// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `sqlx`/SQLite implementations of the domain's repository ports, plus
//! schema bootstrap.

pub mod schema;
pub mod sqlite_asset_repository;
pub mod sqlite_job_repository;
pub mod sqlite_segment_repository;

pub use schema::{create_database_if_missing, ensure_schema, initialize_database};
pub use sqlite_asset_repository::SqliteAssetRepository;
pub use sqlite_job_repository::SqliteJobRepository;
pub use sqlite_segment_repository::SqliteSegmentRepository;
