// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranked source loading.
//!
//! The loader reads every source for an environment in ascending priority and merges
//! their entries into one flat map: a key from a later source always overwrites the same
//! key from an earlier one. Nothing here knows about the schema.

use crate::adapters::{EnvFileAdapter, EnvVarAdapter};
use crate::domain::{ConfigError, Environment, Result};
use crate::ports::source::{ENVIRONMENT_FILE_PRIORITY, LOCAL_FILE_PRIORITY, TEMPLATE_PRIORITY};
use crate::ports::{ConfigSource, LoadIssue};
use directories::ProjectDirs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the template file, the lowest-precedence source.
pub const TEMPLATE_FILE: &str = ".env.example";
/// Name of the local override file.
pub const LOCAL_FILE: &str = ".env.local";

/// Outcome of reading one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// The source was read (possibly contributing nothing).
    Loaded,
    /// The source could not be read; see the load issues.
    Failed,
}

/// Per-source summary of a load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Source name.
    pub name: String,
    /// Merge priority.
    pub priority: u8,
    /// Number of entries the source produced.
    pub entries: usize,
    /// Whether the source could be read.
    pub status: SourceStatus,
}

/// The merged result of loading every source for one environment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Environment the sources were selected for.
    pub environment: Environment,
    /// Merged raw entries, keyed by variable name.
    pub merged: BTreeMap<String, String>,
    /// Non-fatal problems, in source order.
    pub issues: Vec<LoadIssue>,
    /// One summary per source, in merge order.
    pub sources: Vec<SourceSummary>,
}

/// Presence of one expected source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// File name, e.g. `.env.production`.
    pub name: String,
    /// Full path.
    pub path: PathBuf,
    /// Whether a complete checkout is expected to contain the file.
    pub required: bool,
    /// Whether the file exists.
    pub exists: bool,
}

/// Loads and merges ranked configuration sources.
///
/// The built-in sources for an environment are, lowest precedence first: the template
/// file, the environment file, the local override and the process environment. Extra
/// sources registered with [`with_source`](SourceLoader::with_source) join the merge at
/// their own priority; sources with equal priority keep registration order, built-ins
/// first.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::service::SourceLoader;
/// use miaoda_config::domain::Environment;
///
/// # fn main() -> miaoda_config::domain::Result<()> {
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join(".env.example"), "PORT=1420\nLOG_LEVEL=info\n")?;
/// std::fs::write(dir.path().join(".env.local"), "PORT=3000\n")?;
///
/// let loader = SourceLoader::new(dir.path()).with_process_env([("LOG_LEVEL", "warn")]);
/// let report = loader.load_sources(Environment::Development)?;
/// assert_eq!(report.merged["PORT"], "3000");
/// assert_eq!(report.merged["LOG_LEVEL"], "warn");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SourceLoader {
    root: PathBuf,
    process_env: Option<EnvVarAdapter>,
    extra_sources: Vec<Arc<dyn ConfigSource>>,
}

impl SourceLoader {
    /// Creates a loader reading files under `root` and the live process environment.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            process_env: Some(EnvVarAdapter::new()),
            extra_sources: Vec::new(),
        }
    }

    /// Creates a loader rooted in the platform configuration directory.
    ///
    /// Falls back to the current directory when no home directory can be determined.
    pub fn from_default_location() -> Self {
        Self::new(Self::default_root())
    }

    /// Returns the platform configuration directory for the application.
    pub fn default_root() -> PathBuf {
        match ProjectDirs::from("com", "miaoda", "miaoda") {
            Some(dirs) => dirs.config_dir().to_path_buf(),
            None => {
                tracing::debug!("No platform config directory, using the current directory");
                PathBuf::from(".")
            }
        }
    }

    /// Replaces the live process environment with fixed values.
    pub fn with_process_env<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.process_env = Some(EnvVarAdapter::with_values(values));
        self
    }

    /// Leaves the process environment out of the merge.
    pub fn without_process_env(mut self) -> Self {
        self.process_env = None;
        self
    }

    /// Registers an extra source.
    pub fn with_source(self, source: impl ConfigSource + 'static) -> Self {
        self.with_shared_source(Arc::new(source))
    }

    /// Registers an extra source that is shared with other loaders.
    pub fn with_shared_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.extra_sources.push(source);
        self
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_sources(&self, env: Environment) -> Vec<EnvFileAdapter> {
        vec![
            EnvFileAdapter::new(self.root.join(TEMPLATE_FILE), TEMPLATE_PRIORITY),
            EnvFileAdapter::new(self.root.join(env.file_name()), ENVIRONMENT_FILE_PRIORITY),
            EnvFileAdapter::new(self.root.join(LOCAL_FILE), LOCAL_FILE_PRIORITY),
        ]
    }

    /// Reads every source for `env` and merges them by precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SourceError`] only when every source failed to read.
    pub fn load_sources(&self, env: Environment) -> Result<LoadReport> {
        let files = self.file_sources(env);
        let mut sources: Vec<&dyn ConfigSource> =
            files.iter().map(|f| f as &dyn ConfigSource).collect();
        if let Some(process_env) = &self.process_env {
            sources.push(process_env);
        }
        sources.extend(self.extra_sources.iter().map(|s| s.as_ref()));
        sources.sort_by_key(|s| s.priority());

        let mut report = LoadReport {
            environment: env,
            ..LoadReport::default()
        };
        let mut failures = 0;

        for source in &sources {
            match source.load() {
                Ok(load) => {
                    report.sources.push(SourceSummary {
                        name: source.name().to_string(),
                        priority: source.priority(),
                        entries: load.entries.len(),
                        status: SourceStatus::Loaded,
                    });
                    report.merged.extend(load.entries);
                    report.issues.extend(load.issues);
                }
                Err(e) => {
                    tracing::warn!("Failed to load source '{}': {}", source.name(), e);
                    failures += 1;
                    report.sources.push(SourceSummary {
                        name: source.name().to_string(),
                        priority: source.priority(),
                        entries: 0,
                        status: SourceStatus::Failed,
                    });
                    report.issues.push(LoadIssue::new(source.name(), e.to_string()));
                }
            }
        }

        if !sources.is_empty() && failures == sources.len() {
            return Err(ConfigError::SourceError {
                source_name: "all".to_string(),
                message: format!("all {} configuration sources failed to load", failures),
                source: None,
            });
        }

        tracing::info!(
            "Loaded {} raw keys for {} from {} sources ({} issues)",
            report.merged.len(),
            env,
            sources.len(),
            report.issues.len()
        );
        Ok(report)
    }

    /// Reports which of the expected source files exist.
    ///
    /// The template and the three environment files are required; the local override
    /// is optional.
    pub fn inventory(&self) -> Vec<FileStatus> {
        let mut names: Vec<(String, bool)> = vec![(TEMPLATE_FILE.to_string(), true)];
        names.extend(Environment::ALL.iter().map(|env| (env.file_name(), true)));
        names.push((LOCAL_FILE.to_string(), false));

        names
            .into_iter()
            .map(|(name, required)| {
                let path = self.root.join(&name);
                let exists = path.is_file();
                FileStatus {
                    name,
                    path,
                    required,
                    exists,
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extra: Vec<&str> = self.extra_sources.iter().map(|s| s.name()).collect();
        f.debug_struct("SourceLoader")
            .field("root", &self.root)
            .field("process_env", &self.process_env.is_some())
            .field("extra_sources", &extra)
            .finish()
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new(".")
    }
}
