//! Template interpolation for secret mappings.
//!
//! # Reference Format
//!
//! References are written as `$NAME` or `${NAME}` where `NAME` is made of
//! `[a-zA-Z0-9_]`. A backslash in front of the dollar sign (`\$NAME`,
//! `\${NAME}`) keeps the reference literal: the backslash is dropped and
//! no lookup happens.
//!
//! # Missing Variables
//!
//! The whole template is scanned before failing, so a single error lists
//! every unresolved name in the order it was found.
//!
//! # Example
//!
//! ```
//! use secretsenv::interpolation::interpolate;
//! use std::collections::HashMap;
//!
//! let mut vars = HashMap::new();
//! vars.insert("user".to_string(), "admin".to_string());
//! vars.insert("host".to_string(), "db.internal".to_string());
//!
//! let url = interpolate("postgres://${user}@$host/app", &vars).unwrap();
//! assert_eq!(url, "postgres://admin@db.internal/app");
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use thiserror::Error;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\\)?\$\{?[a-zA-Z0-9_]+\}?").expect("reference pattern is valid")
});

/// Interpolation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    /// Referenced names absent from the variable map, in discovery order.
    #[error("variable not found: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

impl InterpolationError {
    /// Names that could not be resolved.
    pub fn missing(&self) -> &[String] {
        match self {
            Self::MissingVariables(names) => names,
        }
    }
}

/// Replace `$NAME` / `${NAME}` references in `template` with values from `vars`.
///
/// # Errors
///
/// Returns [`InterpolationError::MissingVariables`] naming every reference
/// that has no entry in `vars`.
pub fn interpolate(
    template: &str,
    vars: &HashMap<String, String>,
) -> Result<String, InterpolationError> {
    let mut missing = Vec::new();

    let substituted = REFERENCE.replace_all(template, |caps: &Captures<'_>| {
        let token = &caps[0];

        if let Some(escaped) = token.strip_prefix('\\') {
            return escaped.to_string();
        }

        let name = reference_name(token);
        match vars.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(InterpolationError::MissingVariables(missing));
    }

    Ok(substituted.replace("\\$", "$"))
}

/// Strip the `$`, `${` and `}` decoration from a matched reference.
fn reference_name(token: &str) -> &str {
    token
        .trim_start_matches(&['$', '{'][..])
        .trim_end_matches('}')
}
