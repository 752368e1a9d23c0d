//! Harness configuration.
//!
//! The configuration file is optional; every field has a default. The queue
//! sizes themselves are build-time constants of `queue-core` and cannot be
//! configured here.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Harness configuration loaded from TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which script to run
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter, e.g. "warn" or "queue_core=trace".
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps.
    #[serde(default)]
    pub timestamps: bool,

    /// Include the event target (module path).
    #[serde(default)]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
            timestamps: false,
            target: false,
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_string()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Script selection.
///
/// Precedence: `--script` on the command line, then `script`, then
/// `commands`. With none of them the reference scenario runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Path to a script file.
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Inline script, one command per entry.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Print pool and operation statistics after the run.
    #[serde(default)]
    pub stats: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Parse error: {0}")]
    Parse(toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(!config.logging.timestamps);
        assert!(config.scenario.script.is_none());
        assert!(config.scenario.commands.is_empty());
        assert!(!config.scenario.stats);
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            level = "queue_core=trace"
            format = "json"
            timestamps = true
            target = true

            [scenario]
            commands = ["create a", "enqueue a 1", "dequeue a"]
            stats = true
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "queue_core=trace");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.timestamps);
        assert!(config.logging.target);
        assert_eq!(config.scenario.commands.len(), 3);
        assert!(config.scenario.stats);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = toml::from_str("[scenario]\nqueues = 65\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_format_rejected() {
        let result: Result<Config, _> = toml::from_str("[logging]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_example_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/harness.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.scenario.stats);

        let source = config.scenario.commands.join("\n");
        assert!(crate::script::Script::parse(&source).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/queue-harness.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
