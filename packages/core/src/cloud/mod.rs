//! Secret loader backends.
//!
//! A loader turns an opaque secret identifier plus backend options into a
//! flat map of string fields. Loaders are looked up by the `type` tag of a
//! configuration entry through a [`LoaderRegistry`].
//!
//! # Supported Backends
//!
//! - `aws`: AWS Secrets Manager

pub mod aws;

use std::collections::HashMap;
use std::fmt;

pub use aws::AwsSecretsManagerLoader;

/// Flat map of secret field name to value, as produced by a loader.
pub type SecretResult = HashMap<String, String>;

/// Backend-specific options, passed through to the loader untouched.
pub type LoaderOptions = serde_json::Map<String, serde_json::Value>;

/// A backend that can fetch one secret.
pub trait SecretLoader {
    /// Fetch `secret_id` and flatten it into string fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be fetched or any field cannot
    /// be represented as a string.
    fn load(&self, secret_id: &str, options: &LoaderOptions) -> anyhow::Result<SecretResult>;
}

/// Loaders keyed by their configuration type tag.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Box<dyn SecretLoader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(aws::LOADER_TYPE, AwsSecretsManagerLoader::new());
        registry
    }

    /// Register `loader` under `loader_type`, replacing any previous one.
    pub fn register<L>(&mut self, loader_type: impl Into<String>, loader: L)
    where
        L: SecretLoader + 'static,
    {
        self.loaders.insert(loader_type.into(), Box::new(loader));
    }

    pub fn get(&self, loader_type: &str) -> Option<&dyn SecretLoader> {
        self.loaders.get(loader_type).map(|loader| loader.as_ref())
    }

    pub fn contains(&self, loader_type: &str) -> bool {
        self.loaders.contains_key(loader_type)
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.loaders.keys().collect();
        types.sort();
        f.debug_struct("LoaderRegistry")
            .field("types", &types)
            .finish()
    }
}
