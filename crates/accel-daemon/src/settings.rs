//! Daemon settings: built-in defaults, optional TOML file, then environment

use accel_pipeline::PipelineConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::Level;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Simulated sensor options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// How often the simulated sensor raises its interrupt (Hz)
    pub interrupt_hz: u32,
    /// Run time before shutting down (seconds)
    pub duration_secs: u64,
    /// Number of reader tasks
    pub readers: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interrupt_hz: 1000,
            duration_secs: 10,
            readers: 2,
        }
    }
}

/// Top-level daemon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// trace, debug, info, warn or error
    pub log_level: String,
    pub pipeline: PipelineConfig,
    pub simulation: SimulationConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pipeline: PipelineConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, layering `path` (if given) and `ACCEL__*` variables over defaults
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("ACCEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the daemon cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.simulation.interrupt_hz == 0 {
            return Err(SettingsError::Invalid {
                field: "simulation.interrupt_hz",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.simulation.readers as usize > self.pipeline.max_readers {
            return Err(SettingsError::Invalid {
                field: "simulation.readers",
                reason: format!(
                    "{} readers requested but pipeline allows {}",
                    self.simulation.readers, self.pipeline.max_readers
                ),
            });
        }
        self.log_level
            .parse::<Level>()
            .map_err(|err| SettingsError::Invalid {
                field: "log_level",
                reason: err.to_string(),
            })?;
        Ok(())
    }

    /// Parsed log level, INFO if unparsable
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}
