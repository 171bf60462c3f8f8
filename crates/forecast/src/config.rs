//! Forecast configuration
//!
//! Layered lowest to highest: built-in defaults, an optional config file,
//! `FORECAST_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_POINT_MODEL: &str = "ml/point_model.json";
const DEFAULT_SEQUENCE_MODEL: &str = "ml/sequence_model.onnx";
const DEFAULT_SCALER: &str = "ml/scaler.json";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log line format on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable lines (default)
    #[default]
    Text,
}

/// Forecast configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Multi-output regression model used by `point`
    #[serde(default = "default_point_model")]
    pub point_model_path: PathBuf,

    /// Recurrent model used by `sequence`
    #[serde(default = "default_sequence_model")]
    pub sequence_model_path: PathBuf,

    /// Min-max scaler fitted with the sequence model
    #[serde(default = "default_scaler")]
    pub scaler_path: PathBuf,

    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_point_model() -> PathBuf {
    PathBuf::from(DEFAULT_POINT_MODEL)
}

fn default_sequence_model() -> PathBuf {
    PathBuf::from(DEFAULT_SEQUENCE_MODEL)
}

fn default_scaler() -> PathBuf {
    PathBuf::from(DEFAULT_SCALER)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            point_model_path: default_point_model(),
            sequence_model_path: default_sequence_model(),
            scaler_path: default_scaler(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub point_model: Option<PathBuf>,
    pub sequence_model: Option<PathBuf>,
    pub scaler: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ForecastConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("FORECAST"))
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(path) = overrides.point_model {
            self.point_model_path = path;
        }
        if let Some(path) = overrides.sequence_model {
            self.sequence_model_path = path;
        }
        if let Some(path) = overrides.scaler {
            self.scaler_path = path;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        self
    }
}
