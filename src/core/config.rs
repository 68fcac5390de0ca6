//! Configuration management for the relay.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{Result, RelayError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metric naming configuration
    pub naming: NamingConfig,
    /// Host/application context stamped on every metric
    pub context: ContextConfig,
    /// Whitelist filter configuration
    pub filter: FilterConfig,
    /// Sink configuration
    pub sink: SinkConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Metric naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Recognized hierarchy keys, in the order they appear in metric names
    pub key_priority: Vec<String>,
}

/// Context configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Host identifier reported with every metric
    pub host_id: String,
    /// Application identifier reported with every metric
    pub app_id: String,
}

/// Whitelist filter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Apply the whitelist to built metric names
    pub enabled: bool,
    /// Whitelist file, one name, glob or `._p_` regex per line
    pub whitelist_file: Option<PathBuf>,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Which sink receives the metric batches
    pub kind: SinkKind,
    /// Base URL of the timeline collector
    pub collector_url: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Attempts per batch, including the first one
    pub max_attempts: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include targets, thread ids and line numbers
    pub structured: bool,
}

/// Sink kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// HTTP timeline collector
    Timeline,
    /// Timeline JSON payload on stdout
    Stdout,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            naming: NamingConfig::default(),
            context: ContextConfig::default(),
            filter: FilterConfig::default(),
            sink: SinkConfig::default(),
            logging: LoggingConfig::default(),
            debug: false,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            key_priority: ["type", "name", "request", "topic", "partition"]
                .iter()
                .map(|key| (*key).to_string())
                .collect(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            host_id: std::env::var("HOSTNAME")
                .ok()
                .filter(|host| !host.is_empty())
                .unwrap_or_else(|| "localhost".to_string()),
            app_id: "jmx".to_string(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            kind: SinkKind::Timeline,
            collector_url: "http://localhost:6188".to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Naming validation
        if self.naming.key_priority.is_empty() {
            return Err(RelayError::config("naming.key_priority must not be empty"));
        }

        let mut seen = HashSet::with_capacity(self.naming.key_priority.len());
        for key in &self.naming.key_priority {
            if key.trim().is_empty() {
                return Err(RelayError::config("naming.key_priority contains an empty key"));
            }
            if !seen.insert(key.as_str()) {
                return Err(RelayError::config(format!(
                    "naming.key_priority lists '{}' more than once",
                    key
                )));
            }
        }

        // Context validation
        if self.context.host_id.trim().is_empty() {
            return Err(RelayError::config("context.host_id must not be empty"));
        }

        if self.context.app_id.trim().is_empty() {
            return Err(RelayError::config("context.app_id must not be empty"));
        }

        // Filter validation
        if self.filter.enabled && self.filter.whitelist_file.is_none() {
            return Err(RelayError::config(
                "filter.enabled requires filter.whitelist_file",
            ));
        }

        // Sink validation
        if self.sink.kind == SinkKind::Timeline
            && !(self.sink.collector_url.starts_with("http://")
                || self.sink.collector_url.starts_with("https://"))
        {
            return Err(RelayError::config(format!(
                "sink.collector_url must be an http(s) URL, got '{}'",
                self.sink.collector_url
            )));
        }

        if self.sink.max_attempts == 0 {
            return Err(RelayError::config("sink.max_attempts must be greater than 0"));
        }

        if self.sink.timeout.is_zero() {
            return Err(RelayError::config("sink.timeout must be greater than 0"));
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| RelayError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the hierarchy key priority list
    pub fn key_priority<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.naming.key_priority = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set host id
    pub fn host_id(mut self, host_id: impl Into<String>) -> Self {
        self.config.context.host_id = host_id.into();
        self
    }

    /// Set app id
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.context.app_id = app_id.into();
        self
    }

    /// Enable the whitelist filter with the given file
    pub fn whitelist_file(mut self, path: PathBuf) -> Self {
        self.config.filter.enabled = true;
        self.config.filter.whitelist_file = Some(path);
        self
    }

    /// Set sink kind
    pub fn sink_kind(mut self, kind: SinkKind) -> Self {
        self.config.sink.kind = kind;
        self
    }

    /// Set collector URL
    pub fn collector_url(mut self, url: impl Into<String>) -> Self {
        self.config.sink.collector_url = url.into();
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
