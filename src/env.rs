//! Read-only view of the environment variable table.
//!
//! Configuration loading goes through [`Env`] instead of calling
//! [`std::env::var`] directly, so tests can hand the loader a fixed set of
//! variables without touching the process environment.

use std::collections::HashMap;
use std::env::VarError;

/// Source of environment variables.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// `None` reads the real process environment.
    vars: Option<HashMap<String, String>>,
}

impl Env {
    /// Environment backed by the running process.
    pub fn real() -> Self {
        Self { vars: None }
    }

    /// Environment backed by explicit key/value pairs.
    #[cfg(test)]
    pub fn mock<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up a variable.
    ///
    /// Returns `None` when the variable is unset or set to the empty string.
    /// A value that is not valid unicode is also treated as unset, so callers
    /// fall back to their default; that case is logged as a warning.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(map) => map.get(name).cloned(),
            None => decode(name, std::env::var(name)),
        };

        value.filter(|v| !v.is_empty())
    }
}

fn decode(name: &str, value: Result<String, VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        // The value is not logged; it may be a credential.
        Err(VarError::NotUnicode(_)) => {
            tracing::warn!(
                key = name,
                "Ignoring environment variable that is not valid unicode, using default"
            );
            None
        }
    }
}
