use std::path::Path;

use nagrik_core::config::{ClientConfig, ClientConfigFile};

use crate::commands::common::AppContext;
use crate::config::{load_from_path, save_to_path};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub delivery_timeout_secs: Option<u64>,
    pub probe_interval_secs: Option<u64>,
}

pub fn run_config_show(context: &AppContext) {
    let config = &context.config;
    println!("Config file:        {}", context.config_path.display());
    println!("Draft store:        {}", context.db_path.display());
    println!(
        "Reporting endpoint: {}",
        config.api_base_url.as_deref().unwrap_or("(not configured)")
    );
    println!(
        "API token:          {}",
        if config.api_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("Delivery timeout:   {}s", config.delivery_timeout.as_secs());
    println!("Probe interval:     {}s", config.probe_interval.as_secs());
}

/// Merge `update` into the config file at `path` and save it.
pub fn run_config_set(update: ConfigUpdate, path: &Path) -> Result<ClientConfigFile, CliError> {
    let mut file = load_from_path(path).map_err(CliError::Config)?;
    if let Some(url) = update.api_url {
        file.api_base_url = Some(url);
    }
    if let Some(token) = update.api_token {
        file.api_token = Some(token);
    }
    if let Some(secs) = update.delivery_timeout_secs {
        file.delivery_timeout_secs = Some(secs);
    }
    if let Some(secs) = update.probe_interval_secs {
        file.probe_interval_secs = Some(secs);
    }

    // Validate without letting the environment mask a bad file value
    ClientConfig::resolve(file.clone(), |_| None)
        .map_err(|error| CliError::Config(error.to_string()))?;

    save_to_path(&file, path).map_err(CliError::Config)?;
    println!("{}", path.display());
    Ok(file)
}
