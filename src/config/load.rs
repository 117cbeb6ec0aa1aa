use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::settings::OrchestratorConfig;

/// Location used when no `--config` path is given.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
    Ok(home
        .join(".config")
        .join("llm-orchestrator")
        .join("config.toml"))
}

/// Reads the TOML config (a missing file yields defaults) and then layers
/// environment credentials on top.
pub fn load_config(path_override: Option<PathBuf>) -> Result<OrchestratorConfig, ConfigError> {
    let path = match path_override {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = read_config(&path)?;
    config.apply_env();
    Ok(config)
}

pub(super) fn read_config(path: &Path) -> Result<OrchestratorConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            log::debug!("Loaded config from {}", path.display());
            Ok(toml::from_str(&contents)?)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(OrchestratorConfig::default())
        }
        Err(err) => Err(ConfigError::Io(err)),
    }
}
