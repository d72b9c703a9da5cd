//! Error taxonomy for loading and exporting secrets.
//!
//! Every failure aborts the current invocation. Loader failures are carried
//! verbatim so backend diagnostics reach the user untouched.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::interpolation::InterpolationError;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while locating, reading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {file_name} not found in {} or any parent directory", .start.display())]
    NotFound { file_name: String, start: PathBuf },

    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid entry '{entry}': {reason}")]
    Invalid { entry: String, reason: String },
}

/// Top-level error for one invocation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("specified secret {0} not found in the configuration file")]
    EntryNotFound(String),

    #[error("specified loader {0} not found")]
    LoaderNotFound(String),

    #[error(transparent)]
    Loader(anyhow::Error),

    #[error("specified key {variable} not found in the secret {secret_id}")]
    VariableNotFound { variable: String, secret_id: String },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error("failed to write exports")]
    Output(#[from] io::Error),
}
