//! Map loaded secret fields onto environment variables.

use std::collections::BTreeMap;

use crate::cloud::SecretResult;
use crate::config::{SecretOption, VariableSource};
use crate::error::{Error, Result};
use crate::interpolation::interpolate;

/// Environment variable name to its final value.
pub type SecretMapping = BTreeMap<String, String>;

/// Resolve every variable of `option` against `secrets`.
///
/// [`VariableSource::Direct`] copies the same-named field; a template is
/// interpolated with the secret fields as variables. The first failing
/// variable aborts the whole entry.
///
/// # Errors
///
/// - [`Error::VariableNotFound`] if a direct variable has no matching field
/// - [`Error::Interpolation`] if a template references missing fields
pub fn resolve_mapping(option: &SecretOption, secrets: &SecretResult) -> Result<SecretMapping> {
    let mut mapping = SecretMapping::new();

    for (variable, source) in &option.variables {
        let value = match source {
            VariableSource::Direct => secrets
                .get(variable)
                .cloned()
                .ok_or_else(|| Error::VariableNotFound {
                    variable: variable.clone(),
                    secret_id: option.secret_id.clone(),
                })?,
            VariableSource::Template(template) => interpolate(template, secrets)?,
        };
        mapping.insert(variable.clone(), value);
    }

    Ok(mapping)
}
