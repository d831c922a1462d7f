//! Command-line configuration parsing.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::descriptor::Target;

/// Configuration loaded from a TOML file. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// How reports are printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Memory model used to size pointer-carrying values.
    pub target: Target,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// One JSON document.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"warn"` or `"wit_layout=trace"`.
    pub level: String,
    pub format: LogFormat,
    /// Colour text output when writing to a terminal.
    pub color: bool,
    /// `"stderr"`, `"stdout"`, or a file path to append to.
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            color: true,
            output: "stderr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[output]
target = "wasm64"
format = "json"

[logging]
level = "wit_layout=trace"
color = false
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.output.target, Target::Wasm64);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging.level, "wit_layout=trace");
        assert!(!config.logging.color);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output.target, Target::Wasm32);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_toml("[output]\ntarget = \"arm\""),
            Err(ConfigError::Parse(_))
        ));
        let err = Config::from_file("/nonexistent/wit-layout.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/wit-layout.toml"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wit-layout.toml");
        std::fs::write(&path, "[output]\ntarget = \"native\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output.target, Target::Native);
    }
}
