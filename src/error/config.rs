use std::path::PathBuf;
use thiserror::Error;

use super::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Scenario '{scenario}' cannot set both stages and vus/duration.")]
    StagingConflict { scenario: String },
    #[error("Scenario '{scenario}' must define at least one stage.")]
    EmptyStages { scenario: String },
    #[error("Invalid stage {index} in scenario '{scenario}': {source}")]
    InvalidStage {
        scenario: String,
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid duration for scenario '{scenario}': {source}")]
    InvalidScenarioDuration {
        scenario: String,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid threshold for '{metric}': {source}")]
    InvalidThreshold {
        metric: String,
        #[source]
        source: ValidationError,
    },
}
