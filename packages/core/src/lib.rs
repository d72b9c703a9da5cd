//! Secretsenv - export secrets from cloud secret stores as shell variables.
//!
//! This library loads secrets through pluggable loaders, maps their fields
//! onto environment variables (optionally through `$VAR` templates) and
//! formats them as `export` statements.

pub mod cloud;
pub mod config;
pub mod error;
pub mod interpolation;
pub mod mapping;
pub mod runner;

pub use error::{ConfigError, Error, Result};
