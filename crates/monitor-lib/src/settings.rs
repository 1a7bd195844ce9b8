//! Tool settings
//!
//! Layered from built-in defaults, an optional JSON file at
//! `~/.config/gmon/config.json`, and `GMON_*` environment variables
//! (nested keys separated by `__`, e.g. `GMON_ENDPOINTS__LOGGING`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_DASHBOARD_CONFIG, DEFAULT_METRICS_CONFIG};
use crate::error::Result;

/// Base URLs of the management APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_billing_endpoint")]
    pub billing: String,
    #[serde(default = "default_budgets_endpoint")]
    pub budgets: String,
    #[serde(default = "default_logging_endpoint")]
    pub logging: String,
    #[serde(default = "default_monitoring_endpoint")]
    pub monitoring: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            billing: default_billing_endpoint(),
            budgets: default_budgets_endpoint(),
            logging: default_logging_endpoint(),
            monitoring: default_monitoring_endpoint(),
        }
    }
}

impl Endpoints {
    /// Point every service at the same base URL
    pub fn all(base_url: &str) -> Self {
        Self {
            billing: base_url.to_string(),
            budgets: base_url.to_string(),
            logging: base_url.to_string(),
            monitoring: base_url.to_string(),
        }
    }
}

/// Settings shared by all four tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application name used in budget display names and for matching
    /// dashboards and budgets during validation
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// OAuth2 bearer token for the management APIs
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_dashboard_config_path")]
    pub dashboard_config_path: PathBuf,

    #[serde(default = "default_metrics_config_path")]
    pub metrics_config_path: PathBuf,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Per-request timeout; unset means requests wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_app_name() -> String {
    "DressUp AI".to_string()
}

fn default_dashboard_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_DASHBOARD_CONFIG)
}

fn default_metrics_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_METRICS_CONFIG)
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_billing_endpoint() -> String {
    "https://cloudbilling.googleapis.com".to_string()
}

fn default_budgets_endpoint() -> String {
    "https://billingbudgets.googleapis.com".to_string()
}

fn default_logging_endpoint() -> String {
    "https://logging.googleapis.com".to_string()
}

fn default_monitoring_endpoint() -> String {
    "https://monitoring.googleapis.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            access_token: None,
            dashboard_config_path: default_dashboard_config_path(),
            metrics_config_path: default_metrics_config_path(),
            currency: default_currency(),
            request_timeout_secs: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl Settings {
    /// Load settings from the user config file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path().as_deref())
    }

    /// Load settings with an explicit (optional) config file
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with(config_file, environment())
    }

    fn load_with(config_file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder.add_source(env).build()?;

        Ok(config.try_deserialize()?)
    }

    /// Location of the user config file
    pub fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("gmon").join("config.json"))
    }
}

/// `GMON_ACCESS_TOKEN` sets `access_token`, `GMON_ENDPOINTS__LOGGING` sets
/// `endpoints.logging`
fn environment() -> config::Environment {
    config::Environment::with_prefix("GMON")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_absent() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("missing.json"))).unwrap();
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.request_timeout_secs, None);
        assert_eq!(settings.metrics_config_path, PathBuf::from("log-metrics.yaml"));
        assert_eq!(settings.endpoints.logging, "https://logging.googleapis.com");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"app_name": "Acme Shop", "endpoints": {"monitoring": "http://localhost:9000"}}"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.app_name, "Acme Shop");
        assert_eq!(settings.endpoints.monitoring, "http://localhost:9000");
        assert_eq!(settings.endpoints.billing, "https://cloudbilling.googleapis.com");
    }

    fn env_source(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_name": "Acme Shop", "access_token": "file-token"}"#)
            .unwrap();

        let env = env_source(&[
            ("GMON_ACCESS_TOKEN", "tok-single"),
            ("GMON_APP_NAME", "Env App"),
            ("GMON_ENDPOINTS__LOGGING", "http://env-logging"),
            ("GMON_REQUEST_TIMEOUT_SECS", "12"),
        ]);
        let settings = Settings::load_with(Some(&path), env).unwrap();

        assert_eq!(settings.access_token.as_deref(), Some("tok-single"));
        assert_eq!(settings.app_name, "Env App");
        assert_eq!(settings.endpoints.logging, "http://env-logging");
        assert_eq!(settings.endpoints.billing, "https://cloudbilling.googleapis.com");
        assert_eq!(settings.request_timeout_secs, Some(12));
    }

    #[test]
    fn test_unprefixed_variables_ignored() {
        let dir = TempDir::new().unwrap();
        let env = env_source(&[("ACCESS_TOKEN", "stray"), ("GMONX_APP_NAME", "Other")]);
        let settings = Settings::load_with(Some(&dir.path().join("missing.json")), env).unwrap();

        assert_eq!(settings.access_token, None);
        assert_eq!(settings.app_name, "DressUp AI");
    }

    #[test]
    fn test_endpoints_all() {
        let endpoints = Endpoints::all("http://127.0.0.1:1234");
        assert_eq!(endpoints.budgets, "http://127.0.0.1:1234");
        assert_eq!(endpoints.logging, "http://127.0.0.1:1234");
    }
}
