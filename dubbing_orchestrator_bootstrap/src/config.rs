// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap-Phase Configuration
//!
//! `AppConfig` is the validated result of CLI parsing: which subcommand to
//! run, an optional config file override, and the process-wide log level.
//! It deliberately knows nothing about the orchestrator's own `Settings`
//! (database URL, allowed languages, stage engines, ...) — that layered
//! config lives in `dubbing-orchestrator`'s `infrastructure::config` and is
//! loaded separately once `main.rs` knows the config path this struct
//! resolved.

use std::path::PathBuf;

/// Process-wide log level, translated to a `tracing::Level` at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Validated, immutable bootstrap configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    queue_override: Option<String>,
    data_dir_override: Option<PathBuf>,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn queue_override(&self) -> Option<&str> {
        self.queue_override.as_deref()
    }

    pub fn data_dir_override(&self) -> Option<&PathBuf> {
        self.data_dir_override.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    queue_override: Option<String>,
    data_dir_override: Option<PathBuf>,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn queue_override(mut self, queue: impl Into<String>) -> Self {
        self.queue_override = Some(queue.into());
        self
    }

    pub fn data_dir_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir_override = Some(path.into());
        self
    }

    pub fn build(self) -> AppConfig {
        AppConfig {
            app_name: self.app_name.expect("app_name is required"),
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            queue_override: self.queue_override,
            data_dir_override: self.data_dir_override,
        }
    }
}
