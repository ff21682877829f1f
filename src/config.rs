//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - ram_ir.toml (default configuration)
//! - ram_ir.local.toml (git-ignored local overrides)
//! - Environment variables (RAM_IR_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # ram_ir.toml
//! [passes]
//! max_iterations = 10
//! verify_after_each_pass = true
//! enable_constant_folding = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! RAM_IR_PASSES__MAX_ITERATIONS=4
//! RAM_IR_LOGGING__LEVEL=trace
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub passes: PassConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pass pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    /// Maximum number of rounds over the whole pipeline before giving up on
    /// a fixpoint
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Check every relation reference after each pass
    #[serde(default = "default_true")]
    pub verify_after_each_pass: bool,

    #[serde(default = "default_true")]
    pub enable_constant_folding: bool,

    #[serde(default = "default_true")]
    pub enable_sequence_flattening: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

// Default value functions
fn default_max_iterations() -> usize {
    10
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. ram_ir.toml (base configuration)
    /// 2. ram_ir.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (RAM_IR_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("ram_ir.toml"))
            .merge(Toml::file("ram_ir.local.toml"))
            .merge(Env::prefixed("RAM_IR_").split("__"))
            .extract()
    }

    /// Load configuration from specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("RAM_IR_").split("__"))
            .extract()
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        PassConfig {
            max_iterations: default_max_iterations(),
            verify_after_each_pass: true,
            enable_constant_folding: true,
            enable_sequence_flattening: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.passes.max_iterations, 10);
        assert!(config.passes.verify_after_each_pass);
        assert!(config.passes.enable_constant_folding);
        assert!(config.passes.enable_sequence_flattening);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("[passes]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.passes.max_iterations, 10);
        assert_eq!(back.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let back: Config = toml::from_str("[passes]\nmax_iterations = 3\n").unwrap();
        assert_eq!(back.passes.max_iterations, 3);
        assert!(back.passes.verify_after_each_pass);
        assert_eq!(back.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_log_format_serde() {
        let json = serde_json::to_string(&LogFormat::Text).unwrap();
        assert_eq!(json, "\"text\"");
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }
}
