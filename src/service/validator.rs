// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration validation.
//!
//! Validation never stops at the first problem: every rule runs over every field and
//! contributes findings. Errors make a configuration invalid; warnings never do.
//! Environment posture advisories are a separate, purely informational check.

use crate::domain::schema::{ConfigurationSchema, FieldSpec, FieldType, DISTINCT_PAIRS};
use crate::domain::{ConfigStore, ConfigValue, Environment};
use serde::Serialize;
use std::fmt;

/// How serious a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the configuration.
    Error,
    /// Reported only.
    Warning,
}

/// A single validation result for one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Error or warning.
    pub severity: Severity,
}

impl ValidationFinding {
    fn error(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
            severity: Severity::Error,
        }
    }

    fn warning(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
            severity: Severity::Warning,
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All findings for one configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` iff there are no errors.
    pub is_valid: bool,
    /// Blocking findings, in rule order.
    pub errors: Vec<ValidationFinding>,
    /// Non-blocking findings, in rule order.
    pub warnings: Vec<ValidationFinding>,
}

impl ValidationResult {
    fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Logs every finding: errors at error level, warnings at warn level.
    pub fn log(&self) {
        for finding in &self.errors {
            tracing::error!("Configuration error: {}", finding);
        }
        for finding in &self.warnings {
            tracing::warn!("Configuration warning: {}", finding);
        }
    }
}

/// A mismatch between a setting and what the environment expects.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostureAdvisory {
    /// Environment the expectation belongs to.
    pub environment: Environment,
    /// Dotted path of the field.
    pub field: String,
    /// Description of the expected value.
    pub expected: String,
    /// The value found.
    pub actual: ConfigValue,
    /// Human-readable description.
    pub message: String,
}

enum Expectation {
    Equals(ConfigValue),
    Present,
}

fn posture_expectations(env: Environment) -> Vec<(&'static str, Expectation)> {
    use Expectation::*;
    match env {
        Environment::Production => vec![
            ("external.updater.disabled", Equals(false.into())),
            ("devTools.debug.enabled", Equals(false.into())),
            ("devTools.logging.enableConsole", Equals(false.into())),
            ("devTools.logging.level", Equals("info".into())),
            ("build.sourceMaps", Equals(false.into())),
            ("external.posthog.key", Present),
            ("security.signing.privateKey", Present),
        ],
        Environment::Development => vec![
            ("external.updater.disabled", Equals(true.into())),
            ("devTools.debug.enabled", Equals(true.into())),
            ("devTools.logging.enableConsole", Equals(true.into())),
            ("devTools.logging.level", Equals("debug".into())),
        ],
        Environment::Test => vec![
            ("external.updater.disabled", Equals(true.into())),
            ("extensions.mcp.enabled", Equals(false.into())),
            ("test.enableE2E", Equals(true.into())),
        ],
    }
}

/// Runs the validation rules.
///
/// Rules run in a fixed order (required, range, port, URL, enum, cross-field, type) and
/// each walks the schema in declaration order, so validating the same configuration twice
/// yields identical results.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::domain::defaults::resolved_defaults;
/// use miaoda_config::domain::Environment;
/// use miaoda_config::service::Validator;
///
/// let mut config = resolved_defaults(Environment::Development);
/// config.set("devTools.hmr.port", 1420);
///
/// let result = Validator.validate(&config);
/// assert!(!result.is_valid);
/// assert_eq!(result.errors[0].field, "devTools.hmr.port");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Validates `config` against every rule.
    pub fn validate(&self, config: &ConfigStore) -> ValidationResult {
        let mut findings = Vec::new();
        check_required(config, &mut findings);
        check_ranges(config, &mut findings);
        check_ports(config, &mut findings);
        check_urls(config, &mut findings);
        check_enums(config, &mut findings);
        check_distinct_pairs(config, &mut findings);
        check_types(config, &mut findings);
        ValidationResult::from_findings(findings)
    }

    /// Compares `config` against the posture expected for `env`.
    pub fn posture(&self, env: Environment, config: &ConfigStore) -> Vec<PostureAdvisory> {
        let mut advisories = Vec::new();
        for (field, expectation) in posture_expectations(env) {
            let actual = config.get(field).cloned().unwrap_or_default();
            match expectation {
                Expectation::Equals(expected) if actual != expected => {
                    advisories.push(PostureAdvisory {
                        environment: env,
                        field: field.to_string(),
                        message: format!(
                            "{} expects {} = {}, found {}",
                            env, field, expected, actual
                        ),
                        expected: expected.to_string(),
                        actual,
                    })
                }
                Expectation::Present if !actual.is_present() => {
                    advisories.push(PostureAdvisory {
                        environment: env,
                        field: field.to_string(),
                        message: format!("{} requires {} to be set", env, field),
                        expected: "<set>".to_string(),
                        actual,
                    })
                }
                _ => {}
            }
        }
        advisories
    }
}

fn value_of<'a>(config: &'a ConfigStore, field: &FieldSpec) -> &'a ConfigValue {
    static NULL: ConfigValue = ConfigValue::Null;
    config.get(field.path).unwrap_or(&NULL)
}

fn check_required(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::required() {
        if !value_of(config, field).is_present() {
            findings.push(ValidationFinding::error(
                field.path,
                format!("{} is required", field.path),
            ));
        }
    }
}

fn check_ranges(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::ranged() {
        let Some((min, max)) = field.range else {
            continue;
        };
        let Some(n) = value_of(config, field).as_number() else {
            continue;
        };
        if n < min || n > max {
            findings.push(ValidationFinding::warning(
                field.path,
                format!(
                    "{} = {} is outside the recommended range {}-{}",
                    field.path, n, min, max
                ),
            ));
        }
    }
}

fn check_ports(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::ports() {
        let value = value_of(config, field);
        if !value.is_present() {
            continue;
        }
        let valid = value
            .as_i64(field.path)
            .map(|port| (1..=65535).contains(&port))
            .unwrap_or(false);
        if !valid {
            findings.push(ValidationFinding::error(
                field.path,
                format!(
                    "{} must be a port number between 1 and 65535, got '{}'",
                    field.path, value
                ),
            ));
        }
    }
}

fn check_urls(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::of_type(FieldType::Url) {
        let value = value_of(config, field);
        if !value.is_present() {
            continue;
        }
        let parsed = match value.as_str() {
            Some(s) => url::Url::parse(s).map(|_| ()).map_err(|e| e.to_string()),
            None => Err(format!("expected a string, found {}", value.type_name())),
        };
        if let Err(reason) = parsed {
            findings.push(ValidationFinding::warning(
                field.path,
                format!("{} is not a valid URL ('{}'): {}", field.path, value, reason),
            ));
        }
    }
}

fn check_enums(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::of_type(FieldType::Enum(&[])) {
        let Some(allowed) = field.allowed_values() else {
            continue;
        };
        let value = value_of(config, field);
        if !value.is_present() {
            continue;
        }
        let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
        if !ok {
            findings.push(ValidationFinding::error(
                field.path,
                format!(
                    "{} has invalid value '{}', expected one of: {}",
                    field.path,
                    value,
                    allowed.join(", ")
                ),
            ));
        }
    }
}

fn check_distinct_pairs(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for (first, second) in DISTINCT_PAIRS {
        let (Some(a), Some(b)) = (config.get(first), config.get(second)) else {
            continue;
        };
        if !a.is_present() || !b.is_present() {
            continue;
        }
        let same = match (a.as_i64(first), b.as_i64(second)) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        };
        if same {
            findings.push(ValidationFinding::error(
                second,
                format!("{} must differ from {} (both are {})", second, first, b),
            ));
        }
    }
}

fn check_types(config: &ConfigStore, findings: &mut Vec<ValidationFinding>) {
    for field in ConfigurationSchema::fields() {
        if field.port {
            continue;
        }
        let value = value_of(config, field);
        if value.is_null() {
            continue;
        }
        let matches = match field.field_type {
            FieldType::Boolean => matches!(value, ConfigValue::Bool(_)),
            FieldType::Integer => matches!(value, ConfigValue::Integer(_)),
            FieldType::Float => matches!(value, ConfigValue::Float(_) | ConfigValue::Integer(_)),
            FieldType::String | FieldType::Url | FieldType::Enum(_) => true,
        };
        if !matches {
            findings.push(ValidationFinding::warning(
                field.path,
                format!(
                    "{} should be {}, found {} '{}'",
                    field.path,
                    field.field_type.name(),
                    value.type_name(),
                    value
                ),
            ));
        }
    }
}
