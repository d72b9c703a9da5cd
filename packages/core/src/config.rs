// Secretsenv Configuration Module
//
// This module handles locating, loading and validating .secretsenv.yml

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cloud::LoaderOptions;
use crate::error::ConfigError;

/// Default configuration file name searched for by [`Config::discover`].
pub const DEFAULT_CONFIG_FILE: &str = ".secretsenv.yml";

/// Where an environment variable takes its value from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub enum VariableSource {
    /// Copy the secret field with the same name as the variable.
    Direct,

    /// Interpolate a template against the loaded secret.
    Template(String),
}

impl From<Option<String>> for VariableSource {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(template) => Self::Template(template),
            None => Self::Direct,
        }
    }
}

/// Null means [`VariableSource::Direct`]; any other scalar is template text.
impl TryFrom<serde_yaml::Value> for VariableSource {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value;

        match value {
            Value::Null => Ok(Self::Direct),
            Value::String(template) => Ok(Self::Template(template)),
            Value::Number(n) => Ok(Self::Template(n.to_string())),
            Value::Bool(b) => Ok(Self::Template(b.to_string())),
            Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
                Err("expected a template string, number, boolean or null".to_string())
            }
        }
    }
}

/// One secret to fetch and the variables derived from it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecretOption {
    /// Loader type tag (e.g. "aws")
    #[serde(rename = "type", default)]
    pub loader_type: String,

    /// Backend-specific secret identifier
    #[serde(rename = "secretId")]
    pub secret_id: String,

    /// Options passed as-is to the loader
    #[serde(default)]
    pub option: LoaderOptions,

    /// Every other key: environment variable name to its source
    #[serde(flatten)]
    pub variables: BTreeMap<String, VariableSource>,
}

/// Main configuration structure: entry name to secret option.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub entries: BTreeMap<String, SecretOption>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from YAML text
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Search `start` and its ancestors for [`DEFAULT_CONFIG_FILE`].
    pub fn discover(start: &Path) -> Result<PathBuf, ConfigError> {
        start
            .ancestors()
            .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConfigError::NotFound {
                file_name: DEFAULT_CONFIG_FILE.to_string(),
                start: start.to_path_buf(),
            })
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&SecretOption> {
        self.entries.get(name)
    }

    /// Entry names in processing order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, entry) in &self.entries {
            if entry.secret_id.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    entry: name.clone(),
                    reason: "secretId cannot be empty".to_string(),
                });
            }

            if let Some(variable) = entry.variables.keys().find(|v| !is_shell_identifier(v)) {
                return Err(ConfigError::Invalid {
                    entry: name.clone(),
                    reason: format!("'{}' is not a valid environment variable name", variable),
                });
            }
        }

        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_shell_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
