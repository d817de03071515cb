// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export and reporting.
//!
//! Exports are always masked: any leaf whose name looks like a credential and holds a
//! non-empty string is replaced with [`MASK`] before serialization.

use crate::domain::{ConfigError, ConfigStore, ConfigValue, Environment, Result};
use crate::ports::LoadIssue;
use crate::service::loader::{FileStatus, SourceLoader};
use crate::service::manager::ConfigManager;
use crate::service::validator::{PostureAdvisory, ValidationFinding};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Replacement text for masked values.
pub const MASK: &str = "***masked***";

/// Leaf-name fragments that mark a value as sensitive (matched case-insensitively).
const SENSITIVE_FRAGMENTS: &[&str] = &["key", "token", "password", "secret", "dsn"];

/// Serialization format for exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML (requires the `yaml` feature).
    Yaml,
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// Returns `true` if a leaf with this name holds a credential.
pub fn is_sensitive(leaf: &str) -> bool {
    let lower = leaf.to_ascii_lowercase();
    SENSITIVE_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Returns a copy of `config` with every sensitive, non-empty string leaf masked.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::domain::{ConfigStore, ConfigValue};
/// use miaoda_config::service::report::{mask, MASK};
///
/// let config: ConfigStore = [
///     ("external.openai.apiKey", ConfigValue::from("sk-live")),
///     ("external.openai.model", ConfigValue::from("gpt-4")),
///     ("external.grok.apiKey", ConfigValue::Null),
/// ]
/// .into_iter()
/// .collect();
///
/// let masked = mask(&config);
/// assert_eq!(masked.get("external.openai.apiKey"), Some(&ConfigValue::from(MASK)));
/// assert_eq!(masked.get("external.openai.model"), Some(&ConfigValue::from("gpt-4")));
/// assert_eq!(masked.get("external.grok.apiKey"), Some(&ConfigValue::Null));
/// ```
pub fn mask(config: &ConfigStore) -> ConfigStore {
    let mut masked = config.clone();
    for (key, value) in config.leaves() {
        let sensitive = value.as_str().is_some_and(|s| !s.is_empty()) && is_sensitive(key.leaf());
        if sensitive {
            masked.set(key.as_str(), MASK);
        }
    }
    masked
}

/// Serializes any value in `format`.
fn serialize<T: Serialize>(value: &T, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        #[cfg(feature = "yaml")]
        ExportFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        #[cfg(not(feature = "yaml"))]
        ExportFormat::Yaml => Err(ConfigError::UnsupportedFormat {
            format: format.to_string(),
        }),
    }
}

/// Masks and serializes `config`.
pub fn export(config: &ConfigStore, format: ExportFormat) -> Result<String> {
    serialize(&mask(config), format)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

impl ConfigManager {
    /// Exports the current configuration, masked, as a string.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        export(self.config(), format)
    }

    /// Exports the current configuration, masked, to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        write_file(path.as_ref(), &self.export(format)?)
    }
}

/// Validation outcome for one environment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvironmentReport {
    /// Whether the configuration has no errors.
    pub valid: bool,
    /// Blocking findings.
    pub errors: Vec<ValidationFinding>,
    /// Non-blocking findings.
    pub warnings: Vec<ValidationFinding>,
    /// Posture mismatches.
    pub advisories: Vec<PostureAdvisory>,
    /// Number of raw keys the sources produced.
    pub raw_keys: usize,
    /// Non-fatal load problems.
    pub issues: Vec<LoadIssue>,
    /// The masked resolved configuration.
    pub config: ConfigStore,
}

/// Totals across every environment of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Environments checked.
    pub total: usize,
    /// Environments without errors.
    pub valid: usize,
    /// Warnings across all environments.
    pub warnings: usize,
    /// Errors across all environments.
    pub errors: usize,
}

/// Validation report covering every environment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfigReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Which source files exist.
    pub files: Vec<FileStatus>,
    /// Per-environment outcome, keyed by environment name.
    pub environments: BTreeMap<String, EnvironmentReport>,
    /// Totals.
    pub summary: ReportSummary,
}

impl ConfigReport {
    /// Loads and validates every environment with `loader`.
    ///
    /// # Errors
    ///
    /// Fails if every source of some environment fails to load.
    pub fn generate(loader: &SourceLoader) -> Result<Self> {
        let mut environments = BTreeMap::new();
        let mut summary = ReportSummary::default();

        for env in Environment::ALL {
            let mut manager = ConfigManager::with_loader(env, loader.clone());
            manager.load()?;
            let result = manager.validate();

            summary.total += 1;
            if result.is_valid {
                summary.valid += 1;
            }
            summary.warnings += result.warnings.len();
            summary.errors += result.errors.len();

            environments.insert(
                env.to_string(),
                EnvironmentReport {
                    valid: result.is_valid,
                    errors: result.errors,
                    warnings: result.warnings,
                    advisories: manager.posture(),
                    raw_keys: manager.raw_entries().len(),
                    issues: manager.issues().to_vec(),
                    config: mask(manager.config()),
                },
            );
        }

        tracing::info!(
            "Report: {}/{} environments valid, {} errors, {} warnings",
            summary.valid,
            summary.total,
            summary.errors,
            summary.warnings
        );

        Ok(Self {
            generated_at: Utc::now(),
            files: loader.inventory(),
            environments,
            summary,
        })
    }

    /// Returns `true` if every environment is valid.
    pub fn all_valid(&self) -> bool {
        self.summary.valid == self.summary.total
    }

    /// Serializes the report.
    pub fn render(&self, format: ExportFormat) -> Result<String> {
        serialize(self, format)
    }

    /// Writes the report to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        write_file(path.as_ref(), &self.render(format)?)
    }
}

/// Returns the masked value of a single leaf, for display.
pub fn display_value(path: &str, value: &ConfigValue) -> String {
    let leaf = path.rsplit('.').next().unwrap_or(path);
    match value.as_str() {
        Some(s) if !s.is_empty() && is_sensitive(leaf) => MASK.to_string(),
        _ => value.to_string(),
    }
}
