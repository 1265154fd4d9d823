//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::handoff::deeplink::DEFAULT_MAX_LENGTH;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Deeplink settings.
    #[serde(default)]
    pub deeplink: DeeplinkConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "HTTP port must be non-zero".to_string(),
            });
        }
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "HTTP host must not be empty".to_string(),
            });
        }
        if self.deeplink.max_length == 0 {
            return Err(ConfigError::ValidationError {
                message: "deeplink max_length must be greater than zero".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Applies command-line overrides.
    ///
    /// `--http` can only switch HTTP mode on; `--port` replaces the configured
    /// port whether or not HTTP mode ends up enabled.
    #[must_use]
    pub fn with_overrides(mut self, http: bool, port: Option<u16>) -> Self {
        if http {
            self.http.enabled = true;
        }
        if let Some(port) = port {
            self.http.port = port;
        }
        self
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Serve over HTTP instead of stdio.
    #[serde(default)]
    pub enabled: bool,

    /// Address to bind.
    /// Default: "0.0.0.0"
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    /// Default: 8080
    #[serde(default = "default_port")]
    pub port: u16,
}

impl HttpConfig {
    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

/// Deeplink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeeplinkConfig {
    /// Longest deeplink (in characters) that is still opened in a browser.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for DeeplinkConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
        }
    }
}

const fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
