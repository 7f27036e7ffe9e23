//! Backend location and gating.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which backend to talk to and whether to talk to it at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Use `production_url` instead of `development_url`.
    #[serde(default)]
    pub use_production: bool,

    #[serde(default = "default_production_url")]
    pub production_url: String,

    #[serde(default = "default_development_url")]
    pub development_url: String,

    /// When false every request resolves to `BackendDisabled` without being
    /// dispatched.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Overall transport timeout. `None` leaves it to the transport.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            use_production: false,
            production_url: default_production_url(),
            development_url: default_development_url(),
            enabled: default_enabled(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Development config pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            development_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `BACKEND_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(flag) = read_flag("BACKEND_USE_PRODUCTION")? {
            config.use_production = flag;
        }
        if let Some(url) = read_url("BACKEND_PRODUCTION_URL")? {
            config.production_url = url;
        }
        if let Some(url) = read_url("BACKEND_DEVELOPMENT_URL")? {
            config.development_url = url;
        }
        if let Some(flag) = read_flag("BACKEND_ENABLED")? {
            config.enabled = flag;
        }
        if let Ok(value) = env::var("BACKEND_TIMEOUT_SECS") {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "BACKEND_TIMEOUT_SECS".to_string(),
                value,
            })?;
            config.timeout_secs = Some(secs);
        }
        Ok(config)
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        if self.use_production {
            &self.production_url
        } else {
            &self.development_url
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_production_url() -> String {
    "http://foobar:8000/api/".to_string()
}

fn default_development_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_enabled() -> bool {
    true
}

fn read_flag(var: &str) -> Result<Option<bool>, ConfigError> {
    let Ok(value) = env::var(var) else {
        return Ok(None);
    };
    parse_flag(&value).map(Some).ok_or_else(|| ConfigError::InvalidFlag {
        var: var.to_string(),
        value,
    })
}

fn read_url(var: &str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyUrl {
            var: var.to_string(),
        }),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
