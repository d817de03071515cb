// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process environment configuration source adapter.
//!
//! This module provides an adapter that reads every variable of the live process
//! environment. It is the highest-precedence built-in source.

use crate::domain::Result;
use crate::ports::source::PROCESS_ENV_PRIORITY;
use crate::ports::{ConfigSource, RawEntry, SourceLoad};
use std::collections::BTreeMap;
use std::env;

/// Maximum length for environment variable keys.
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (1MB).
const MAX_ENV_VALUE_LEN: usize = 1048576;

/// Configuration source adapter for the process environment.
///
/// All variables are copied, not only those the schema declares, so raw lookups can see
/// ambient variables too. Variables whose name or value is not valid Unicode are skipped.
///
/// # Priority
///
/// The process environment has priority 3 and overrides every file source.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::adapters::EnvVarAdapter;
/// use miaoda_config::ports::ConfigSource;
/// use std::collections::HashMap;
///
/// let adapter = EnvVarAdapter::with_values(HashMap::from([
///     ("LOG_LEVEL".to_string(), "warn".to_string()),
/// ]));
/// let load = adapter.load().unwrap();
/// assert_eq!(load.entries, vec![("LOG_LEVEL".to_string(), "warn".to_string())]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvVarAdapter {
    /// Fixed values used instead of the live environment.
    values: Option<BTreeMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter over the live process environment.
    pub fn new() -> Self {
        Self { values: None }
    }

    /// Creates an adapter with pre-populated values.
    ///
    /// **Note**: This is primarily intended for tests, which should not mutate the real
    /// process environment.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Some(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn read_process(&self) -> Vec<RawEntry> {
        let mut vars: BTreeMap<String, String> = BTreeMap::new();

        for (key, value) in env::vars_os() {
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                tracing::debug!("Skipping non-UTF-8 environment variable");
                continue;
            };
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }
            vars.insert(key.to_string(), value.to_string());
        }

        vars.into_iter().collect()
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "process-env"
    }

    fn priority(&self) -> u8 {
        PROCESS_ENV_PRIORITY
    }

    fn load(&self) -> Result<SourceLoad> {
        let entries = match &self.values {
            Some(values) => values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => self.read_process(),
        };
        tracing::debug!("Loaded {} environment variables", entries.len());
        Ok(SourceLoad::from_entries(entries))
    }
}
