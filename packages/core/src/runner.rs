//! Drive one invocation: select entries, load secrets, print exports.
//!
//! # Example
//!
//! ```no_run
//! use secretsenv::cloud::LoaderRegistry;
//! use secretsenv::config::Config;
//! use secretsenv::runner::SecretsEnv;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::from_file(".secretsenv.yml")?;
//! let secrets_env = SecretsEnv::new(LoaderRegistry::with_builtin());
//!
//! let mut stdout = std::io::stdout().lock();
//! secrets_env.run(&config, &[], &mut stdout)?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use tracing::debug;

use crate::cloud::LoaderRegistry;
use crate::config::{Config, SecretOption};
use crate::error::{Error, Result};
use crate::mapping::{resolve_mapping, SecretMapping};

/// Loads configured secrets through registered loaders.
#[derive(Debug)]
pub struct SecretsEnv {
    loaders: LoaderRegistry,
}

impl SecretsEnv {
    pub fn new(loaders: LoaderRegistry) -> Self {
        Self { loaders }
    }

    /// Fetch one entry's secret and resolve its variables.
    ///
    /// # Errors
    ///
    /// - [`Error::LoaderNotFound`] if no loader is registered for the entry type
    /// - [`Error::Loader`] with the loader's own error
    /// - any error from [`resolve_mapping`]
    pub fn load(&self, option: &SecretOption) -> Result<SecretMapping> {
        let loader = self
            .loaders
            .get(&option.loader_type)
            .ok_or_else(|| Error::LoaderNotFound(option.loader_type.clone()))?;

        let secrets = loader
            .load(&option.secret_id, &option.option)
            .map_err(Error::Loader)?;
        debug!(
            secret_id = %option.secret_id,
            fields = secrets.len(),
            "Loaded secret"
        );

        resolve_mapping(option, &secrets)
    }

    /// Resolve the named entries (all entries when `names` is empty).
    ///
    /// Entries are processed in order and the first failure stops the run.
    pub fn resolve(&self, config: &Config, names: &[String]) -> Result<Vec<(String, SecretMapping)>> {
        let selected: Vec<&str> = if names.is_empty() {
            config.names().collect()
        } else {
            names.iter().map(String::as_str).collect()
        };

        let mut resolved = Vec::with_capacity(selected.len());
        for name in selected {
            let option = config
                .get(name)
                .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

            debug!(entry = name, loader = %option.loader_type, "Processing entry");
            let mapping = self.load(option)?;
            resolved.push((name.to_string(), mapping));
        }

        Ok(resolved)
    }

    /// Resolve the named entries and write them as `export` lines.
    ///
    /// Nothing is written unless every entry resolves.
    pub fn run<W: Write>(&self, config: &Config, names: &[String], out: &mut W) -> Result<()> {
        let resolved = self.resolve(config, names)?;

        for (_, mapping) in &resolved {
            write_exports(out, mapping)?;
        }
        out.flush()?;

        Ok(())
    }
}

/// Write `export NAME=VALUE` for each variable.
pub fn write_exports<W: Write>(out: &mut W, mapping: &SecretMapping) -> std::io::Result<()> {
    for (name, value) in mapping {
        writeln!(out, "export {}={}", name, value)?;
    }
    Ok(())
}
