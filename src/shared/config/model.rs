use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Number of partial states a sharded fold splits a change log into
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,
}

fn default_shard_count() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
        }
    }
}

/// Guards a host view applies before handing events to the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub reject_non_finite: bool,
    pub allow_negative_weights: bool,
    /// Record the active observation per row so unpaired or duplicate
    /// retractions are rejected instead of corrupting the aggregate.
    pub track_row_identity: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            reject_non_finite: true,
            allow_negative_weights: false,
            track_row_identity: false,
        }
    }
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("RETRACT_AGG_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(config::Environment::with_prefix("RETRACT_AGG").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
