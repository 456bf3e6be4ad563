//! Environment configuration.

use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the text-generation service.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// None leaves the service unconfigured; summaries then fail
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Deadline for one summary request
    pub timeout: Duration,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub summary: SummaryConfig,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = match lookup("SUMMARY_TIMEOUT_SECS") {
            Some(value) => {
                let parsed = value.trim().parse::<u64>().ok().filter(|secs| *secs > 0);
                parsed.ok_or(ConfigError::InvalidNumber {
                    name: "SUMMARY_TIMEOUT_SECS",
                    value,
                })?
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            summary: SummaryConfig {
                api_key: lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty()),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.summary.api_key.is_none());
        assert_eq!(config.summary.model, "gemini-2.0-flash");
        assert_eq!(config.summary.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("SUMMARY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.summary.api_key.as_deref(), Some("secret"));
        assert_eq!(config.summary.model, "gemini-1.5-pro");
        assert_eq!(config.summary.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config_from(&[("GEMINI_API_KEY", "  ")]).unwrap();

        assert!(config.summary.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(matches!(
            config_from(&[("SUMMARY_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config_from(&[("SUMMARY_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }
}
