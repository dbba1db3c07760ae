//! Client configuration.
//!
//! Hosts resolve a [`ClientConfig`] from an optional JSON config file plus
//! `NAGRIK_*` environment overrides. Environment values win over the file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sync::DEFAULT_DELIVERY_TIMEOUT;
use crate::util::{endpoint_base_url, normalize_text_option};
use crate::{Error, Result};

pub const API_URL_ENV: &str = "NAGRIK_API_URL";
pub const API_TOKEN_ENV: &str = "NAGRIK_API_TOKEN";
pub const DELIVERY_TIMEOUT_ENV: &str = "NAGRIK_DELIVERY_TIMEOUT_SECS";
pub const PROBE_INTERVAL_ENV: &str = "NAGRIK_PROBE_INTERVAL_SECS";

/// Default spacing between reachability probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);

/// Resolved runtime configuration for a client host.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the reporting endpoint. `None` means every sync pass
    /// fails delivery and drafts stay queued.
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub delivery_timeout: Duration,
    pub probe_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("delivery_timeout", &self.delivery_timeout)
            .field("probe_interval", &self.probe_interval)
            .finish()
    }
}

/// On-disk shape of the client config file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_interval_secs: Option<u64>,
}

impl ClientConfigFile {
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid config file: {error}")))
    }
}

impl ClientConfig {
    /// Resolve from process environment over `file`.
    pub fn from_env(file: ClientConfigFile) -> Result<Self> {
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolve from `lookup` over `file`.
    pub fn resolve<F>(file: ClientConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = normalize_text_option(lookup(API_URL_ENV))
            .or_else(|| normalize_text_option(file.api_base_url))
            .map(|url| {
                endpoint_base_url(&url).ok_or_else(|| {
                    Error::Config(format!("{API_URL_ENV} must include http:// or https://"))
                })
            })
            .transpose()?;

        let api_token = normalize_text_option(lookup(API_TOKEN_ENV))
            .or_else(|| normalize_text_option(file.api_token));

        let delivery_timeout = seconds(&lookup, DELIVERY_TIMEOUT_ENV)?
            .or(file.delivery_timeout_secs)
            .map_or(DEFAULT_DELIVERY_TIMEOUT, Duration::from_secs);
        let probe_interval = seconds(&lookup, PROBE_INTERVAL_ENV)?
            .or(file.probe_interval_secs)
            .map_or(DEFAULT_PROBE_INTERVAL, Duration::from_secs);

        if delivery_timeout.is_zero() || probe_interval.is_zero() {
            return Err(Error::Config(
                "timeouts and intervals must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_token,
            delivery_timeout,
            probe_interval,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    normalize_text_option(lookup(key))
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| Error::Config(format!("{key} must be a whole number of seconds")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = values
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let config = ClientConfig::resolve(ClientConfigFile::default(), lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.delivery_timeout, Duration::from_secs(15));
    }

    #[test]
    fn environment_overrides_file() {
        let file = ClientConfigFile {
            api_base_url: Some("https://file.example.com".to_string()),
            delivery_timeout_secs: Some(30),
            ..ClientConfigFile::default()
        };
        let config = ClientConfig::resolve(
            file,
            lookup(&[
                (API_URL_ENV, "https://env.example.com/"),
                (PROBE_INTERVAL_ENV, "3"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.api_base_url.as_deref(),
            Some("https://env.example.com")
        );
        assert_eq!(config.delivery_timeout, Duration::from_secs(30));
        assert_eq!(config.probe_interval, Duration::from_secs(3));
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_url = ClientConfig::resolve(
            ClientConfigFile::default(),
            lookup(&[(API_URL_ENV, "api.example.com")]),
        );
        assert!(matches!(bad_url, Err(Error::Config(_))));

        let bad_timeout = ClientConfig::resolve(
            ClientConfigFile::default(),
            lookup(&[(DELIVERY_TIMEOUT_ENV, "soon")]),
        );
        assert!(matches!(bad_timeout, Err(Error::Config(_))));

        let zero = ClientConfig::resolve(
            ClientConfigFile::default(),
            lookup(&[(PROBE_INTERVAL_ENV, "0")]),
        );
        assert!(matches!(zero, Err(Error::Config(_))));
    }

    #[test]
    fn config_file_rejects_unknown_fields() {
        assert!(ClientConfigFile::parse(r#"{"api_base_url":"https://a.example"}"#).is_ok());
        assert!(ClientConfigFile::parse(r#"{"server_url":"x"}"#).is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig {
            api_token: Some("secret".to_string()),
            ..ClientConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
