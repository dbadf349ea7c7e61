// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Fetches a job by its external id.

use std::sync::Arc;

use dubbing_orchestrator_domain::entities::Job;
use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::JobRepository;
use dubbing_orchestrator_domain::value_objects::JobId;

pub struct GetJobUseCase {
    jobs: Arc<dyn JobRepository>,
}

impl GetJobUseCase {
    pub fn new(jobs: Arc<dyn JobRepository>) -> Self {
        Self { jobs }
    }

    pub async fn execute(&self, job_id: JobId) -> Result<Job, OrchestratorError> {
        self.jobs
            .get_by_external_id(job_id)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("job", job_id.to_string()))
    }
}
