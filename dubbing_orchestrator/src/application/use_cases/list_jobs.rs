// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Lists jobs ordered newest-first, paginated.

use std::sync::Arc;

use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{JobPage, JobRepository};

pub struct ListJobsUseCase {
    jobs: Arc<dyn JobRepository>,
}

impl ListJobsUseCase {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    pub async fn execute(&self, page: u32, page_size: u32) -> Result<JobPage, OrchestratorError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        self.jobs.list(page, page_size).await
    }
}
