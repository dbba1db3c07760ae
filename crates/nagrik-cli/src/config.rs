//! Persistent CLI configuration file.

use std::path::{Path, PathBuf};

use nagrik_core::config::{ClientConfig, ClientConfigFile};
use nagrik_core::util::normalize_text_option;

const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nagrik")
        .join(CONFIG_FILE_NAME)
}

/// Load the config file; a missing file is an empty config.
pub fn load_from_path(path: &Path) -> Result<ClientConfigFile, String> {
    if !path.exists() {
        return Ok(ClientConfigFile::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
    let config = ClientConfigFile::parse(&raw)
        .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
    Ok(normalize(config))
}

pub fn save_to_path(config: &ClientConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let serialized = serde_json::to_string_pretty(&normalize(config.clone()))
        .map_err(|error| format!("Failed to serialize config: {error}"))?;
    std::fs::write(path, serialized)
        .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
}

/// Resolve runtime configuration from the file at `path` and the environment.
pub fn resolve(path: &Path) -> Result<ClientConfig, String> {
    let file = load_from_path(path)?;
    ClientConfig::from_env(file).map_err(|error| error.to_string())
}

fn normalize(mut config: ClientConfigFile) -> ClientConfigFile {
    config.api_base_url = normalize_text_option(config.api_base_url)
        .map(|url| url.trim_end_matches('/').to_string());
    config.api_token = normalize_text_option(config.api_token);
    config
}
