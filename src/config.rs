//! Configuration module for the socket-endpoint binding
//!
//! This module provides TOML-based configuration parsing and validation
//! for the static library.

use crate::error::{ConnectError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Ordering applied to resolved addresses before an enumerator yields them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AddressOrder {
    /// Yield addresses in resolver order
    #[default]
    Any,
    /// Yield IPv4 addresses before IPv6 ones
    Ipv4First,
    /// Yield IPv6 addresses before IPv4 ones
    Ipv6First,
}

/// Resolver configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Ordering applied to resolved addresses
    #[serde(default)]
    pub address_order: AddressOrder,
    /// Maximum addresses yielded per lookup (0 = unlimited)
    #[serde(default)]
    pub max_results: u32,
    /// Port assumed when an endpoint string carries none (0 = require explicit port)
    #[serde(default)]
    pub default_port: u16,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            address_order: AddressOrder::Any,
            max_results: 0, // Unlimited by default
            default_port: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to log to a file
    #[serde(default)]
    pub file_logging: bool,
    /// Path to log file
    pub log_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_path: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConnectError::Config(format!("Failed to read config file: {e}")))?;

        <Self as FromStr>::from_str(&contents)
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConnectError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConnectError::Config(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        if self.logging.file_logging && self.logging.log_path.is_none() {
            return Err(ConnectError::Config(
                "File logging requires a log path".to_string(),
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConnectError;

    fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConnectError::Config(format!("Failed to parse TOML: {e}")))
    }
}

// Default value functions for serde
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_content = r#"
[resolver]
address_order = "ipv4-first"
max_results = 8
default_port = 443

[logging]
level = "debug"
"#;

        let config = toml_content
            .parse::<Config>()
            .expect("Failed to parse config");
        assert_eq!(config.resolver.address_order, AddressOrder::Ipv4First);
        assert_eq!(config.resolver.max_results, 8);
        assert_eq!(config.resolver.default_port, 443);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_defaults() {
        let config = "".parse::<Config>().expect("empty config should parse");
        assert_eq!(config.resolver.address_order, AddressOrder::Any);
        assert_eq!(config.resolver.max_results, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Unknown log level should fail
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        // File logging without a path should fail
        config.logging.level = "info".to_string();
        config.logging.file_logging = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml = config.to_toml().expect("serialize");
        let parsed = toml.parse::<Config>().expect("reparse");
        assert_eq!(parsed.resolver.default_port, config.resolver.default_port);
        assert_eq!(parsed.logging.level, config.logging.level);
    }

    #[test]
    fn test_config_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[resolver]\ndefault_port = 8080").expect("write");

        let config = Config::from_file(file.path()).expect("load config");
        assert_eq!(config.resolver.default_port, 8080);
    }
}
