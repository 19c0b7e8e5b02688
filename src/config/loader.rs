use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Override files picked up from the working directory when no path is given.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["loadtest.toml", "loadtest.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideFormat {
    Toml,
    Json,
}

impl OverrideFormat {
    fn detect(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or(ConfigError::MissingExtension)?;
        match ext {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedExtension {
                ext: other.to_owned(),
            }),
        }
    }
}

/// Scenario overrides from `path`, or from the first default file present.
/// `None` when no path is given and no default file exists.
///
/// # Errors
///
/// Returns an error when the selected file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    let selected = path.map(Path::new).or_else(|| {
        DEFAULT_CONFIG_FILES
            .into_iter()
            .map(Path::new)
            .find(|candidate| candidate.exists())
    });
    selected.map(load_config_file).transpose()
}

/// Parse one TOML or JSON override file.
///
/// # Errors
///
/// Returns an error when the extension is not `.toml`/`.json`, or the file
/// cannot be read or parsed.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = OverrideFormat::detect(path)?;
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match format {
        OverrideFormat::Toml => toml::from_str(&raw).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        }),
        OverrideFormat::Json => {
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseJson {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parsed.map_err(AppError::config)
}
