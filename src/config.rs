//! Client configuration
//!
//! `ClientConfig` can be built in code, read from the environment, or loaded
//! from a YAML file. The CLI layers environment values over file values.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Production API origin used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://api.example.com/api";

/// Overall per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Where the application is sent when the session cannot be recovered
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Environment variable holding the API base URL
pub const ENV_BASE_URL: &str = "API_BASE_URL";

/// Environment variable naming the application environment
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Environment variable that forces development mode on or off
pub const ENV_DEV_MODE: &str = "API_DEV_MODE";

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL for relative request paths (usually ends in `/api`)
    pub base_url: String,
    /// Log requests, responses and errors at debug level
    pub dev_mode: bool,
    /// Overall timeout for each request
    pub timeout: Duration,
    /// Navigation target after an unrecoverable auth failure
    pub login_path: String,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dev_mode: false,
            timeout: DEFAULT_TIMEOUT,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            default_headers,
            user_agent: format!("admin-api-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a config from process environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from an environment lookup.
    ///
    /// `API_BASE_URL` replaces the base URL when set and non-empty.
    /// Development mode is on when `APP_ENV` is `development`, unless
    /// `API_DEV_MODE` says otherwise.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }

        if let Some(env) = lookup(ENV_APP_ENV) {
            self.dev_mode = env.eq_ignore_ascii_case("development");
        }

        if let Some(flag) = lookup(ENV_DEV_MODE) {
            self.dev_mode = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Load config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        file.into_config()
    }
}

/// On-disk shape of the config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    dev_mode: Option<bool>,
    /// Timeout in seconds
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    login_path: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    user_agent: Option<String>,
}

impl ConfigFile {
    fn into_config(self) -> Result<ClientConfig> {
        let mut config = ClientConfig::default();

        if let Some(base_url) = self.base_url {
            url::Url::parse(&base_url)?;
            config.base_url = base_url;
        }
        if let Some(dev_mode) = self.dev_mode {
            config.dev_mode = dev_mode;
        }
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(Error::config("timeout must be greater than zero"));
            }
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(login_path) = self.login_path {
            config.login_path = login_path;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        config.default_headers.extend(self.headers);

        Ok(config)
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Enable or disable development-mode logging
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.config.dev_mode = enabled;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the login navigation target
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
