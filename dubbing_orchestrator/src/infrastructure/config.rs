// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! [`Settings`] is loaded once at bootstrap by layering, in increasing
//! precedence: built-in defaults, an optional TOML file, then environment
//! variables (`DUBBING_` prefixed, `__` as the nesting separator). Only the
//! variables this crate actually reads are modeled here; the HTTP-facing
//! ones (`API_KEY_HEADER`, `RATE_LIMIT_PER_MINUTE`, ...) belong to the
//! out-of-scope HTTP layer and are not represented.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use dubbing_orchestrator_domain::error::OrchestratorError;

fn default_database_url() -> String {
    "sqlite://data/app.db".to_string()
}

fn default_broker_queue() -> String {
    "pipeline".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_allowed_languages() -> Vec<String> {
    vec!["en".into(), "es".into(), "fr".into(), "de".into()]
}

fn default_max_active_jobs_per_key() -> u32 {
    5
}

fn default_tts_engine() -> String {
    "piper".to_string()
}

/// `ASR_*` settings: the engine name plus any engine-specific options the
/// worker adapter needs (e.g. model size, device).
#[derive(Debug, Clone, Deserialize)]
pub struct AsrSettings {
    #[serde(default = "default_asr_engine")]
    pub engine: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_asr_engine() -> String {
    "whisper".to_string()
}

impl Default for AsrSettings {
    fn default() -> Self {
        Self {
            engine: default_asr_engine(),
            options: HashMap::new(),
        }
    }
}

/// `MIX_*` settings, including the global vocal-separation switch.
#[derive(Debug, Clone, Deserialize)]
pub struct MixSettings {
    #[serde(default)]
    pub vocal_separation: bool,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self { vocal_separation: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_broker_queue")]
    pub broker_queue: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,

    #[serde(default = "default_max_active_jobs_per_key")]
    pub max_active_jobs_per_key: u32,

    #[serde(default)]
    pub asr: AsrSettings,

    pub libretranslate_url: Option<String>,

    #[serde(default = "default_tts_engine")]
    pub tts_engine: String,

    /// Speaker/preset name to Piper voice file mapping (`PIPER_VOICES`).
    #[serde(default)]
    pub piper_voices: HashMap<String, String>,

    #[serde(default)]
    pub mix: MixSettings,
}

impl Settings {
    /// Loads settings by layering defaults, an optional `config.toml` at
    /// `config_path` (skipped if absent), and `DUBBING_`-prefixed
    /// environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Self, OrchestratorError> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("DUBBING")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| OrchestratorError::internal(format!("failed to build configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| OrchestratorError::internal(format!("failed to parse configuration: {e}")))
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn proc_dir(&self) -> PathBuf {
        self.data_dir.join("proc")
    }

    pub fn pub_dir(&self) -> PathBuf {
        self.data_dir.join("pub")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            database_url: default_database_url(),
            broker_queue: default_broker_queue(),
            data_dir: default_data_dir(),
            allowed_languages: default_allowed_languages(),
            max_active_jobs_per_key: default_max_active_jobs_per_key(),
            asr: AsrSettings::default(),
            libretranslate_url: None,
            tts_engine: default_tts_engine(),
            piper_voices: HashMap::new(),
            mix: MixSettings::default(),
        }
    }
}
