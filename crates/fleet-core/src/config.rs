//! fleet.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{BatchSize, DelayUnit};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FleetConfig {
    #[serde(default)]
    pub authoring: AuthoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Defaults applied by the phase editor when a phase is added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthoringConfig {
    pub default_batch_size: BatchSize,
    pub default_delay: u32,
    pub default_delay_unit: DelayUnit,
}

impl Default for AuthoringConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 10,
            default_delay: 2,
            default_delay_unit: DelayUnit::Hours,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CoreError::InvalidOutputFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default tracing directive, extended by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "fleetctl=info".to_string(),
        }
    }
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded fleet config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a fleet.toml with every section spelled out.
    pub fn scaffold() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scaffold() {
        let toml_str = FleetConfig::scaffold().to_toml_string().unwrap();
        assert!(toml_str.contains("[authoring]"));
        assert!(toml_str.contains("default_delay_unit = \"hours\""));
        assert!(toml_str.contains("fleetctl=info"));
    }

    #[test]
    fn test_parse_empty() {
        let config = FleetConfig::from_toml_str("").unwrap();
        assert_eq!(config, FleetConfig::default());
    }

    #[test]
    fn test_parse_partial_section() {
        let toml_str = r#"
[authoring]
default_delay = 30
default_delay_unit = "minutes"

[output]
format = "json"
"#;
        let config = FleetConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.authoring.default_batch_size, 10);
        assert_eq!(config.authoring.default_delay, 30);
        assert_eq!(config.authoring.default_delay_unit, DelayUnit::Minutes);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nfilter = \"fleetctl=debug\"").unwrap();
        let config = FleetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log.filter, "fleetctl=debug");
    }

    #[test]
    fn test_missing_file() {
        let err = FleetConfig::from_file(Path::new("/nonexistent/fleet.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = FleetConfig::from_toml_str("[output]\nformat = \"yaml\"").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }
}
