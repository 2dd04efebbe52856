use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// How `ipmitool` is located and launched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default = "default_ipmitool")]
    pub ipmitool: String,
    #[serde(default = "default_elevate")]
    pub elevate: Vec<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Errors returned when loading a tool configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl Default for ToolConfig {
    fn default() -> Self {
        let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"));
        parse_config(embedded, "embedded config".to_string()).unwrap_or_else(|_| ToolConfig {
            ipmitool: default_ipmitool(),
            elevate: default_elevate(),
            extra_args: Vec::new(),
        })
    }
}

impl ToolConfig {
    /// Load a configuration from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_config(&raw, path.display().to_string())
    }

    /// Argument vector preceding every ipmitool subcommand.
    pub fn command_prefix(&self) -> Vec<String> {
        let mut prefix = self.elevate.clone();
        prefix.push(self.ipmitool.clone());
        prefix.extend(self.extra_args.iter().cloned());
        prefix
    }
}

fn parse_config(raw: &str, path: String) -> Result<ToolConfig, ConfigLoadError> {
    toml::from_str(raw).map_err(|source| ConfigLoadError::Parse { path, source })
}

fn default_ipmitool() -> String {
    "ipmitool".to_string()
}

fn default_elevate() -> Vec<String> {
    vec!["sudo".to_string()]
}
