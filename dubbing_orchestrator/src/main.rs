// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dubbing Orchestrator CLI
//!
//! The process entry point. Parses and validates arguments through
//! `dubbing-orchestrator-bootstrap`, then composes the concrete
//! infrastructure adapters this crate defines and drives the Pipeline
//! Coordinator's task loop.
//!
//! `migrate` creates or upgrades the SQLite schema and exits. `serve` and
//! `worker` both wire the same coordinator against the same in-process
//! broker and drain its queue until a shutdown signal arrives; a durable,
//! out-of-process broker would be the only thing that distinguishes them
//! in a deployment where the Control API runs as a separate process.

use std::sync::Arc;

use tracing::{info, warn};

use dubbing_orchestrator::infrastructure::logging;
use dubbing_orchestrator::infrastructure::repositories::{initialize_database, SqliteAssetRepository, SqliteJobRepository, SqliteSegmentRepository};
use dubbing_orchestrator::infrastructure::workers::{FsPackageWorker, StubAsrWorker, StubMixWorker, StubTranslateWorker, StubTtsWorker};
use dubbing_orchestrator::{ArtifactStore, InProcessTaskBroker, MetricsService, OrchestratorError, PipelineCoordinator, Settings};
use dubbing_orchestrator_bootstrap::cli::ValidatedCommand;
use dubbing_orchestrator_bootstrap::shutdown::ShutdownCoordinator;
use dubbing_orchestrator_bootstrap::signals::create_signal_handler;
use dubbing_orchestrator_bootstrap::{bootstrap_cli, result_to_exit_code};
use dubbing_orchestrator_domain::value_objects::RetryPolicy;

fn main() -> std::process::ExitCode {
    let validated = match bootstrap_cli() {
        Ok(validated) => validated,
        Err(err) => {
            eprintln!("error: {err}");
            return std::process::ExitCode::from(64);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("error: failed to start async runtime: {err}");
            return std::process::ExitCode::from(71);
        }
    };

    result_to_exit_code(runtime.block_on(run(validated)))
}

async fn run(validated: dubbing_orchestrator_bootstrap::cli::ValidatedCli) -> Result<(), OrchestratorError> {
    let config_path = validated.config.as_deref().and_then(|p| p.to_str());
    let settings = Settings::load(config_path)?;

    logging::init_tracing(&settings.environment);
    info!(environment = %settings.environment, "starting dubbing-orchestrator");

    match validated.command {
        ValidatedCommand::Migrate => run_migrate(&settings).await,
        ValidatedCommand::Serve { queue } | ValidatedCommand::Worker { queue } => {
            run_coordinator(&settings, queue).await
        }
    }
}

async fn run_migrate(settings: &Settings) -> Result<(), OrchestratorError> {
    initialize_database(&settings.database_url)
        .await
        .map_err(|e| OrchestratorError::repository(format!("migration failed: {e}")))?;
    info!("database schema is up to date");
    Ok(())
}

async fn run_coordinator(settings: &Settings, queue_override: Option<String>) -> Result<(), OrchestratorError> {
    let queue = queue_override.unwrap_or_else(|| settings.broker_queue.clone());

    let pool = initialize_database(&settings.database_url)
        .await
        .map_err(|e| OrchestratorError::repository(format!("failed to open database: {e}")))?;

    let jobs = Arc::new(SqliteJobRepository::new(pool.clone()));
    let assets = Arc::new(SqliteAssetRepository::new(pool.clone()));
    let segments = Arc::new(SqliteSegmentRepository::new(pool));
    let artifact_store = Arc::new(ArtifactStore::new(settings.proc_dir()));
    let broker = Arc::new(InProcessTaskBroker::new());
    let metrics = MetricsService::new()?;

    let coordinator = Arc::new(PipelineCoordinator::new(
        jobs,
        assets,
        segments,
        artifact_store,
        broker.clone(),
        Arc::new(StubAsrWorker),
        Arc::new(StubTranslateWorker),
        Arc::new(StubTtsWorker),
        Arc::new(StubMixWorker {
            vocal_separation: settings.mix.vocal_separation,
        }),
        Arc::new(FsPackageWorker::new(settings.pub_dir())),
        metrics,
        RetryPolicy::default(),
        queue.clone(),
        settings.data_dir.clone(),
    ));

    let shutdown = ShutdownCoordinator::new(std::time::Duration::from_secs(10));
    let token = shutdown.token();
    let signals = create_signal_handler();

    let signal_coordinator = shutdown.clone();
    tokio::spawn(async move {
        signals
            .wait_for_signal(Box::new(move || {
                signal_coordinator.initiate_shutdown();
            }))
            .await;
    });

    info!(queue = %queue, "pipeline coordinator draining broker queue");

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("shutdown signal received, draining in-flight work");
                break;
            }
            message = broker.dequeue(&queue) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    coordinator.handle_task(message).await;
                });
            }
        }
    }

    shutdown.complete_shutdown();
    info!("pipeline coordinator stopped");
    Ok(())
}
