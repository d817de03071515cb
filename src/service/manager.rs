// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration manager.
//!
//! `ConfigManager` ties the layers together: it starts from the built-in defaults for
//! its environment, projects the merged raw sources onto the schema, and exposes
//! schema-checked reads and writes with change notification.

use crate::domain::coercion::{coerce, coerce_as};
use crate::domain::defaults::{overlay, resolved_defaults};
use crate::domain::schema::ConfigurationSchema;
use crate::domain::{ConfigError, ConfigStore, ConfigValue, Environment, Result};
use crate::ports::{ChangeEvent, ChangeListener, ConfigSource, LoadIssue};
use crate::service::loader::{LoadReport, SourceLoader, SourceSummary};
use crate::service::notifier::{ChangeNotifier, Subscription};
use crate::service::validator::{PostureAdvisory, ValidationResult, Validator};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves, holds and mutates the configuration for one environment.
///
/// A manager starts out holding the built-in defaults for its environment; call
/// [`load`](ConfigManager::load) to fold in the sources.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::prelude::*;
///
/// # fn main() -> Result<()> {
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join(".env.local"), "HMR_PORT=3001\n")?;
///
/// let mut manager = ConfigManager::builder()
///     .environment(Environment::Test)
///     .root(dir.path())
///     .process_env([("DEBUG_MODE", "1")])
///     .build();
/// manager.load()?;
///
/// assert_eq!(manager.get("devTools.hmr.port"), Some(&ConfigValue::Integer(3001)));
/// assert_eq!(manager.get("devTools.debug.enabled"), Some(&ConfigValue::Bool(true)));
/// assert!(manager.validate().is_valid);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigManager {
    environment: Environment,
    loader: SourceLoader,
    config: ConfigStore,
    raw: BTreeMap<String, String>,
    issues: Vec<LoadIssue>,
    sources: Vec<SourceSummary>,
    notifier: ChangeNotifier,
    validator: Validator,
}

impl ConfigManager {
    /// Creates a manager for `environment` reading sources from the current directory
    /// and the live process environment.
    pub fn new(environment: Environment) -> Self {
        Self::with_loader(environment, SourceLoader::default())
    }

    /// Creates a manager with an explicit loader.
    pub fn with_loader(environment: Environment, loader: SourceLoader) -> Self {
        Self {
            environment,
            loader,
            config: resolved_defaults(environment),
            raw: BTreeMap::new(),
            issues: Vec::new(),
            sources: Vec::new(),
            notifier: ChangeNotifier::new(),
            validator: Validator,
        }
    }

    /// Creates a builder.
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::new()
    }

    /// Loads the sources for the current environment and resolves the configuration.
    ///
    /// # Errors
    ///
    /// Fails only when every source fails to load; the previous configuration is kept.
    pub fn load(&mut self) -> Result<&ConfigStore> {
        self.load_environment(self.environment)
    }

    /// Switches to `environment`, then loads and resolves as [`load`](ConfigManager::load).
    pub fn load_environment(&mut self, environment: Environment) -> Result<&ConfigStore> {
        let report = self.loader.load_sources(environment)?;
        let LoadReport {
            merged,
            issues,
            sources,
            ..
        } = report;

        self.config = Self::resolve(environment, &merged);
        self.environment = environment;
        self.raw = merged;
        self.issues = issues;
        self.sources = sources;

        tracing::info!(
            "Resolved {} configuration from {} raw keys",
            environment,
            self.raw.len()
        );
        Ok(&self.config)
    }

    /// Re-reads every source for the current environment.
    ///
    /// Runtime `set` values are discarded.
    pub fn reload(&mut self) -> Result<&ConfigStore> {
        tracing::debug!("Reloading {} configuration", self.environment);
        self.load_environment(self.environment)
    }

    /// Builds the resolved tree for `environment` from a merged raw map.
    ///
    /// Defaults come first, then every schema field whose variable has a non-empty raw
    /// value is coerced and written over the default.
    pub fn resolve(environment: Environment, raw: &BTreeMap<String, String>) -> ConfigStore {
        let mut config = resolved_defaults(environment);
        for field in ConfigurationSchema::fields() {
            match raw.get(field.env_var) {
                Some(value) if !value.is_empty() => {
                    config.set(field.path, coerce_as(field.field_type, value));
                }
                _ => {}
            }
        }
        config
    }

    /// Returns the value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        self.config.get(path)
    }

    /// Returns the value at a dotted path, failing if it is absent or `Null`.
    pub fn require(&self, path: &str) -> Result<&ConfigValue> {
        match self.config.get(path) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(ConfigError::ConfigKeyNotFound {
                key: path.to_string(),
            }),
        }
    }

    /// Writes `value` at `path` and notifies every listener.
    ///
    /// `path` must be a declared field or section. An event is published even when the
    /// new value equals the old one. Returns the previous value (`Null` if there was none).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for paths outside the schema.
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) -> Result<ConfigValue> {
        if !ConfigurationSchema::accepts(path) {
            return Err(ConfigError::UnknownKey {
                key: path.to_string(),
            });
        }

        let value = value.into();
        let old_value = self
            .config
            .set(path, value.clone())
            .unwrap_or_default();
        tracing::debug!("Set {} = {} (was {})", path, value, old_value);

        let event = ChangeEvent::new(path, old_value.clone(), value);
        self.notifier.publish(&event);
        Ok(old_value)
    }

    /// Looks up a raw merged entry by variable name and coerces it.
    ///
    /// Declared variables are coerced by their field type; others by value sniffing.
    /// Returns `None` for variables no source provided.
    pub fn raw(&self, key: &str) -> Option<ConfigValue> {
        self.raw.get(key).map(|value| coerce(key, value))
    }

    /// Returns the merged raw entries of the last load.
    pub fn raw_entries(&self) -> &BTreeMap<String, String> {
        &self.raw
    }

    /// Validates the current configuration and logs the findings.
    pub fn validate(&self) -> ValidationResult {
        self.validate_config(&self.config)
    }

    /// Validates an arbitrary configuration tree and logs the findings.
    pub fn validate_config(&self, config: &ConfigStore) -> ValidationResult {
        let result = self.validator.validate(config);
        result.log();
        if result.is_valid {
            tracing::info!(
                "{} configuration is valid ({} warnings)",
                self.environment,
                result.warnings.len()
            );
        }
        result
    }

    /// Checks the current configuration against the posture expected for its
    /// environment. Advisories are logged at warn level.
    pub fn posture(&self) -> Vec<PostureAdvisory> {
        let advisories = self.validator.posture(self.environment, &self.config);
        for advisory in &advisories {
            tracing::warn!("Posture advisory: {}", advisory.message);
        }
        advisories
    }

    /// Registers a change listener.
    pub fn subscribe(&self, listener: ChangeListener) -> Subscription {
        self.notifier.subscribe(listener)
    }

    /// Returns the built-in overlay for `environment` without touching any source.
    pub fn environment_overlay(environment: Environment) -> ConfigStore {
        overlay(environment)
    }

    /// Returns the non-fatal issues of the last load.
    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    /// Returns the per-source summaries of the last load.
    pub fn sources(&self) -> &[SourceSummary] {
        &self.sources
    }

    /// Returns the resolved configuration.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Returns the active environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the loader.
    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }
}

/// Builder for constructing a [`ConfigManager`].
///
/// # Examples
///
/// ```rust
/// use miaoda_config::service::ConfigManagerBuilder;
/// use miaoda_config::domain::Environment;
///
/// let manager = ConfigManagerBuilder::new()
///     .environment(Environment::Production)
///     .root("/srv/miaoda")
///     .build();
/// assert_eq!(manager.environment(), Environment::Production);
/// ```
#[derive(Default)]
pub struct ConfigManagerBuilder {
    environment: Option<Environment>,
    root: Option<PathBuf>,
    process_env: Option<Vec<(String, String)>>,
    include_process_env: bool,
    sources: Vec<Arc<dyn ConfigSource>>,
}

impl ConfigManagerBuilder {
    /// Creates a builder; by default the environment comes from `NODE_ENV` and files are
    /// read from the current directory.
    pub fn new() -> Self {
        Self {
            include_process_env: true,
            ..Self::default()
        }
    }

    /// Sets the environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the directory holding the env files.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Reads files from the platform configuration directory.
    pub fn default_location(mut self) -> Self {
        self.root = Some(SourceLoader::default_root());
        self
    }

    /// Uses fixed values instead of the live process environment.
    pub fn process_env<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.process_env = Some(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self.include_process_env = true;
        self
    }

    /// Leaves the process environment out of the merge.
    pub fn without_process_env(mut self) -> Self {
        self.process_env = None;
        self.include_process_env = false;
        self
    }

    /// Registers an extra source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Builds the manager. The configuration holds defaults until it is loaded.
    pub fn build(self) -> ConfigManager {
        let environment = self.environment.unwrap_or_else(Environment::from_process);
        let mut loader = SourceLoader::new(self.root.unwrap_or_else(|| PathBuf::from(".")));

        loader = match (self.include_process_env, self.process_env) {
            (false, _) => loader.without_process_env(),
            (true, Some(values)) => loader.with_process_env(values),
            (true, None) => loader,
        };
        for source in self.sources {
            loader = loader.with_shared_source(source);
        }

        ConfigManager::with_loader(environment, loader)
    }
}

impl std::fmt::Debug for ConfigManagerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManagerBuilder")
            .field("environment", &self.environment)
            .field("root", &self.root)
            .field("include_process_env", &self.include_process_env)
            .field("sources", &self.sources.len())
            .finish()
    }
}
