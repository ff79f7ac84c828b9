//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable naming the upstream API host.
pub const API_URL_VAR: &str = "EZZIFLY_API_URL";

/// Email suffix treated as an existing account in demo mode.
pub const DEFAULT_DEMO_DOMAIN: &str = "@test.com";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to. `None` means every API
    /// call fails with a configuration error.
    pub api_base_url: Option<Url>,
    /// Email suffix that marks demo accounts.
    pub demo_domain: String,
    /// Whether failed calls are replaced with synthesized demo payloads.
    pub demo_fallback: bool,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// JSON file backing the local key-value storage.
    pub storage_path: PathBuf,
    /// Directory for the rolling log file. Logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            demo_domain: DEFAULT_DEMO_DOMAIN.to_string(),
            demo_fallback: true,
            http_timeout: Duration::from_secs(10),
            storage_path: PathBuf::from(".ezzifly/storage.json"),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = match lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(parse_base_url(raw.trim())?),
            None => None,
        };

        let demo_domain = lookup("EZZIFLY_DEMO_DOMAIN")
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .map(|d| if d.starts_with('@') { d } else { format!("@{d}") })
            .unwrap_or(defaults.demo_domain);

        let demo_fallback = match lookup("EZZIFLY_DEMO_FALLBACK") {
            Some(raw) => parse_bool("EZZIFLY_DEMO_FALLBACK", &raw)?,
            None => defaults.demo_fallback,
        };

        let http_timeout = match lookup("EZZIFLY_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EZZIFLY_HTTP_TIMEOUT_SECS".to_string(),
                    message: format!("expected a whole number of seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => defaults.http_timeout,
        };

        let storage_path = lookup("EZZIFLY_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".ezzifly/storage.json")
            });

        let log_dir = lookup("EZZIFLY_LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_base_url,
            demo_domain,
            demo_fallback,
            http_timeout,
            storage_path,
            log_dir,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: API_URL_VAR.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: API_URL_VAR.to_string(),
            message: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true or false, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_api_url_is_not_defaulted() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.api_base_url.is_none());
        assert_eq!(config.demo_domain, "@test.com");
        assert!(config.demo_fallback);
    }

    #[test]
    fn blank_api_url_counts_as_missing() {
        let config = ClientConfig::from_lookup(lookup_from(&[(API_URL_VAR, "  ")])).unwrap();
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(API_URL_VAR, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == API_URL_VAR));

        let err = ClientConfig::from_lookup(lookup_from(&[(API_URL_VAR, "ftp://host")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn reads_all_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://api.ezzifly.test/v1"),
            ("EZZIFLY_DEMO_DOMAIN", "Demo.Example"),
            ("EZZIFLY_DEMO_FALLBACK", "off"),
            ("EZZIFLY_HTTP_TIMEOUT_SECS", "3"),
            ("EZZIFLY_STORAGE_PATH", "/tmp/ezzifly.json"),
            ("EZZIFLY_LOG_DIR", "/tmp/logs"),
        ]))
        .unwrap();

        assert_eq!(
            config.api_base_url.unwrap().as_str(),
            "https://api.ezzifly.test/v1"
        );
        assert_eq!(config.demo_domain, "@demo.example");
        assert!(!config.demo_fallback);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/ezzifly.json"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn storage_path_defaults_under_home() {
        let config = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/ada")])).unwrap();
        assert_eq!(
            config.storage_path,
            PathBuf::from("/home/ada/.ezzifly/storage.json")
        );
    }

    #[test]
    fn bad_bool_and_timeout_are_rejected() {
        assert!(ClientConfig::from_lookup(lookup_from(&[("EZZIFLY_DEMO_FALLBACK", "maybe")])).is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[("EZZIFLY_HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }
}
