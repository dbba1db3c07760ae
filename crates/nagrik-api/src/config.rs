use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Shared bearer token; when unset the report routes are open.
    pub api_token: Option<String>,
    pub rate_limit_window: Duration,
    pub submissions_per_window: u32,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("rate_limit_window", &self.rate_limit_window)
            .field("submissions_per_window", &self.submissions_per_window)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            api_token: None,
            rate_limit_window: Duration::from_secs(60),
            submissions_per_window: 120,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "NAGRIK_API_BIND_ADDR", "127.0.0.1:8080");
        let api_token = optional_trimmed(&lookup, "NAGRIK_API_TOKEN");

        let rate_limit_window_secs = value_or_default(&lookup, "RATE_LIMIT_WINDOW_SECS", "60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "RATE_LIMIT_WINDOW_SECS must be an integer in [10, 3600]".to_string(),
                )
            })?;
        if !(10..=3_600).contains(&rate_limit_window_secs) {
            return Err(ConfigError::Invalid(
                "RATE_LIMIT_WINDOW_SECS must be in [10, 3600]".to_string(),
            ));
        }

        let submissions_per_window =
            value_or_default(&lookup, "REPORT_RATE_LIMIT_PER_WINDOW", "120")
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::Invalid(
                        "REPORT_RATE_LIMIT_PER_WINDOW must be an integer in [1, 5000]".to_string(),
                    )
                })?;
        if !(1..=5_000).contains(&submissions_per_window) {
            return Err(ConfigError::Invalid(
                "REPORT_RATE_LIMIT_PER_WINDOW must be in [1, 5000]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            api_token,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            submissions_per_window,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.api_token, None);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.submissions_per_window, 120);
    }

    #[test]
    fn blank_token_leaves_routes_open() {
        let config = config_from(&[("NAGRIK_API_TOKEN", "   ")]).unwrap();
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn out_of_range_limits_are_rejected() {
        let err = config_from(&[("RATE_LIMIT_WINDOW_SECS", "5")]).unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_WINDOW_SECS"));

        let err = config_from(&[("REPORT_RATE_LIMIT_PER_WINDOW", "lots")]).unwrap_err();
        assert!(err.to_string().contains("REPORT_RATE_LIMIT_PER_WINDOW"));
    }

    #[test]
    fn config_redacts_token_in_debug() {
        let config = config_from(&[("NAGRIK_API_TOKEN", "sensitive-report-token")]).unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("sensitive-report-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
