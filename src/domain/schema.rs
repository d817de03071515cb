// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration schema.
//!
//! Every setting the client understands is declared once here: its dotted path, the
//! environment variable that feeds it, its semantic type and its validation constraints.
//! Coercion, projection of raw sources, path checking in `set` and the validator all read
//! from this table, so adding a setting is a one-line change.

use crate::domain::config_key::ConfigKey;
use crate::domain::environment::Environment;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Allowed log levels.
pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];
/// Allowed UI themes.
pub const THEMES: &[&str] = &["light", "dark", "auto"];
/// Allowed UI locales.
pub const LOCALES: &[&str] = &["zh-CN", "en-US", "ja-JP"];
/// Allowed llama.cpp backends.
pub const LLAMACPP_BACKENDS: &[&str] = &["auto", "cpu", "cuda", "opencl", "metal"];

/// The semantic type of a field, which drives coercion and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text.
    String,
    /// A flag.
    Boolean,
    /// A whole number.
    Integer,
    /// A real number.
    Float,
    /// One of a fixed set of literals (case-sensitive).
    Enum(&'static [&'static str]),
    /// An absolute URL.
    Url,
}

impl FieldType {
    /// Returns a short name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Enum(_) => "enum",
            FieldType::Url => "url",
        }
    }
}

/// Declaration of one leaf setting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSpec {
    /// Dotted path in the resolved tree.
    pub path: &'static str,
    /// Environment variable that feeds the field.
    pub env_var: &'static str,
    /// Semantic type.
    pub field_type: FieldType,
    /// Whether the field must be present and non-empty.
    pub required: bool,
    /// Recommended inclusive numeric range.
    pub range: Option<(f64, f64)>,
    /// Whether the field is a network port.
    pub port: bool,
}

impl FieldSpec {
    const fn new(path: &'static str, env_var: &'static str, field_type: FieldType) -> Self {
        Self {
            path,
            env_var,
            field_type,
            required: false,
            range: None,
            port: false,
        }
    }

    const fn string(path: &'static str, env_var: &'static str) -> Self {
        Self::new(path, env_var, FieldType::String)
    }

    const fn boolean(path: &'static str, env_var: &'static str) -> Self {
        Self::new(path, env_var, FieldType::Boolean)
    }

    const fn integer(path: &'static str, env_var: &'static str) -> Self {
        Self::new(path, env_var, FieldType::Integer)
    }

    const fn float(path: &'static str, env_var: &'static str) -> Self {
        Self::new(path, env_var, FieldType::Float)
    }

    const fn url(path: &'static str, env_var: &'static str) -> Self {
        Self::new(path, env_var, FieldType::Url)
    }

    const fn one_of(
        path: &'static str,
        env_var: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self::new(path, env_var, FieldType::Enum(values))
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    const fn port(mut self) -> Self {
        self.port = true;
        self
    }

    /// Returns the path as a [`ConfigKey`].
    pub fn key(&self) -> ConfigKey {
        ConfigKey::from(self.path)
    }

    /// Returns the allowed values of an enum field.
    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self.field_type {
            FieldType::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// Every declared field, grouped by section in display order.
pub static FIELDS: &[FieldSpec] = &[
    // base
    FieldSpec::string("base.appName", "APP_NAME").required(),
    FieldSpec::string("base.appVersion", "APP_VERSION").required(),
    FieldSpec::one_of("base.nodeEnv", "NODE_ENV", Environment::NAMES).required(),
    FieldSpec::one_of("base.environment", "ENVIRONMENT", Environment::NAMES).required(),
    FieldSpec::integer("base.port", "PORT").port(),
    FieldSpec::string("base.tauriDevHost", "TAURI_DEV_HOST"),
    FieldSpec::boolean("base.isTauri", "IS_TAURI"),
    FieldSpec::boolean("base.isClean", "IS_CLEAN"),
    // external
    FieldSpec::string("external.posthog.key", "POSTHOG_KEY"),
    FieldSpec::url("external.posthog.host", "POSTHOG_HOST"),
    FieldSpec::url("external.modelCatalogUrl", "MODEL_CATALOG_URL"),
    FieldSpec::string("external.openai.apiKey", "OPENAI_API_KEY"),
    FieldSpec::url("external.openai.apiBase", "OPENAI_API_BASE"),
    FieldSpec::string("external.openai.model", "OPENAI_API_MODEL"),
    FieldSpec::string("external.grok.apiKey", "GROK_API_KEY"),
    FieldSpec::url("external.grok.apiBase", "GROK_API_BASE"),
    FieldSpec::string("external.grok.model", "GROK_API_MODEL"),
    FieldSpec::boolean("external.updater.disabled", "AUTO_UPDATER_DISABLED"),
    FieldSpec::url("external.updater.endpoint", "UPDATE_ENDPOINT"),
    // ui
    FieldSpec::one_of("ui.theme.default", "DEFAULT_THEME", THEMES),
    FieldSpec::boolean("ui.theme.syncOS", "THEME_SYNC_OS"),
    FieldSpec::one_of("ui.locale.default", "DEFAULT_LOCALE", LOCALES),
    FieldSpec::one_of("ui.locale.fallback", "FALLBACK_LOCALE", LOCALES),
    FieldSpec::integer("ui.window.width", "WINDOW_WIDTH").range(200.0, 4000.0),
    FieldSpec::integer("ui.window.height", "WINDOW_HEIGHT").range(200.0, 3000.0),
    FieldSpec::integer("ui.window.minWidth", "WINDOW_MIN_WIDTH").range(200.0, 1000.0),
    FieldSpec::integer("ui.window.minHeight", "WINDOW_MIN_HEIGHT").range(200.0, 1000.0),
    // devTools
    FieldSpec::one_of("devTools.logging.level", "LOG_LEVEL", LOG_LEVELS),
    FieldSpec::boolean("devTools.logging.enableConsole", "ENABLE_CONSOLE_LOG"),
    FieldSpec::string("devTools.logging.file", "LOG_FILE"),
    FieldSpec::boolean("devTools.debug.enabled", "DEBUG_MODE"),
    FieldSpec::boolean("devTools.debug.enableDevTools", "ENABLE_DEV_TOOLS"),
    FieldSpec::boolean("devTools.hmr.enabled", "ENABLE_HMR"),
    FieldSpec::integer("devTools.hmr.port", "HMR_PORT").port(),
    FieldSpec::boolean("devTools.quality.eslint", "ESLINT_ENABLED"),
    FieldSpec::boolean("devTools.quality.prettier", "PRETTIER_ENABLED"),
    FieldSpec::boolean("devTools.quality.typeCheck", "TYPE_CHECK_ENABLED"),
    // build
    FieldSpec::boolean("build.bundleAnalyzer", "ENABLE_BUNDLE_ANALYZER"),
    FieldSpec::boolean("build.sourceMaps", "ENABLE_SOURCE_MAPS"),
    FieldSpec::integer("build.chunkSizeLimit", "CHUNK_SIZE_LIMIT"),
    FieldSpec::string("build.target", "BUILD_TARGET"),
    FieldSpec::string("build.features", "BUILD_FEATURES"),
    FieldSpec::string("build.cargoTarget", "CARGO_BUILD_TARGET"),
    // network
    FieldSpec::integer("network.networkTimeout", "NETWORK_TIMEOUT"),
    FieldSpec::integer("network.requestTimeout", "REQUEST_TIMEOUT"),
    FieldSpec::url("network.proxy.http", "HTTP_PROXY"),
    FieldSpec::url("network.proxy.https", "HTTPS_PROXY"),
    FieldSpec::string("network.proxy.username", "PROXY_USERNAME"),
    FieldSpec::string("network.proxy.password", "PROXY_PASSWORD"),
    // security
    FieldSpec::string("security.signing.privateKey", "TAURI_SIGNING_PRIVATE_KEY"),
    FieldSpec::string(
        "security.signing.privateKeyPassword",
        "TAURI_SIGNING_PRIVATE_KEY_PASSWORD",
    ),
    // performance
    FieldSpec::integer("performance.memoryLimit", "MEMORY_LIMIT").range(256.0, 16384.0),
    FieldSpec::integer("performance.cpuThreads", "CPU_THREADS").range(0.0, 128.0),
    FieldSpec::integer("performance.cacheSize", "CACHE_SIZE").range(10.0, 10000.0),
    // extensions
    FieldSpec::boolean("extensions.mcp.enabled", "MCP_ENABLED"),
    FieldSpec::url("extensions.mcp.registryUrl", "MCP_REGISTRY_URL"),
    FieldSpec::boolean("extensions.mcp.autoInstall", "MCP_AUTO_INSTALL"),
    FieldSpec::one_of("extensions.llamacpp.backend", "LLAMACPP_BACKEND", LLAMACPP_BACKENDS),
    FieldSpec::integer("extensions.llamacpp.threads", "LLAMACPP_THREADS"),
    FieldSpec::integer("extensions.llamacpp.gpuLayers", "LLAMACPP_GPU_LAYERS"),
    // storage
    FieldSpec::string("storage.dataDir", "DATA_DIR"),
    FieldSpec::string("storage.modelsDir", "MODELS_DIR"),
    FieldSpec::string("storage.extensionsDir", "EXTENSIONS_DIR"),
    // test
    FieldSpec::integer("test.timeout", "TEST_TIMEOUT"),
    FieldSpec::float("test.coverageThreshold", "COVERAGE_THRESHOLD").range(0.0, 100.0),
    FieldSpec::boolean("test.enableE2E", "ENABLE_E2E_TESTS"),
    FieldSpec::boolean("test.reportPortal.enabled", "ENABLE_REPORTPORTAL"),
    FieldSpec::string("test.reportPortal.token", "RP_TOKEN"),
    FieldSpec::url("test.reportPortal.endpoint", "RP_ENDPOINT"),
    FieldSpec::string("test.reportPortal.project", "RP_PROJECT"),
    FieldSpec::string("test.reportPortal.launch", "RP_LAUNCH"),
    // monitoring
    FieldSpec::boolean("monitoring.performance.enabled", "ENABLE_PERFORMANCE_MONITORING"),
    FieldSpec::string("monitoring.performance.apiKey", "PERFORMANCE_API_KEY"),
    FieldSpec::boolean("monitoring.errorTracking.enabled", "ENABLE_ERROR_TRACKING"),
    FieldSpec::string("monitoring.errorTracking.dsn", "ERROR_TRACKING_DSN"),
    FieldSpec::boolean("monitoring.analytics.enabled", "ENABLE_ANALYTICS"),
    FieldSpec::url("monitoring.analytics.endpoint", "ANALYTICS_ENDPOINT"),
    // cicd
    FieldSpec::string("cicd.github.token", "GITHUB_TOKEN"),
    FieldSpec::boolean("cicd.github.releaseDraft", "RELEASE_DRAFT"),
    FieldSpec::boolean("cicd.github.releasePrerelease", "RELEASE_PRERELEASE"),
];

/// Pairs of fields that must hold different values when both are set.
///
/// The second field of the pair is the one reported.
pub static DISTINCT_PAIRS: &[(&str, &str)] = &[("base.port", "devTools.hmr.port")];

static BY_PATH: Lazy<HashMap<&'static str, &'static FieldSpec>> =
    Lazy::new(|| FIELDS.iter().map(|f| (f.path, f)).collect());

static BY_ENV_VAR: Lazy<HashMap<&'static str, &'static FieldSpec>> =
    Lazy::new(|| FIELDS.iter().map(|f| (f.env_var, f)).collect());

/// Read-only view over the declared fields.
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::schema::{ConfigurationSchema, FieldType};
///
/// let field = ConfigurationSchema::field("ui.window.width").unwrap();
/// assert_eq!(field.env_var, "WINDOW_WIDTH");
/// assert_eq!(field.field_type, FieldType::Integer);
/// assert_eq!(
///     ConfigurationSchema::field_for_env_var("HMR_PORT").map(|f| f.path),
///     Some("devTools.hmr.port")
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationSchema;

impl ConfigurationSchema {
    /// Returns every declared field.
    pub fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    /// Looks a field up by dotted path.
    pub fn field(path: &str) -> Option<&'static FieldSpec> {
        BY_PATH.get(path).copied()
    }

    /// Looks a field up by the environment variable that feeds it.
    pub fn field_for_env_var(name: &str) -> Option<&'static FieldSpec> {
        BY_ENV_VAR.get(name).copied()
    }

    /// Returns `true` if `path` is a declared leaf or a section containing declared leaves.
    pub fn accepts(path: &str) -> bool {
        if BY_PATH.contains_key(path) {
            return true;
        }
        let section = ConfigKey::from(path);
        FIELDS
            .iter()
            .any(|f| section.is_prefix_of(&ConfigKey::from(f.path)))
    }

    /// Returns the required fields.
    pub fn required() -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(|f| f.required)
    }

    /// Returns the fields with a recommended numeric range.
    pub fn ranged() -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(|f| f.range.is_some())
    }

    /// Returns the port fields.
    pub fn ports() -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(|f| f.port)
    }

    /// Returns the fields of the given type class (enum fields match any enum).
    pub fn of_type(kind: FieldType) -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(move |f| {
            std::mem::discriminant(&f.field_type) == std::mem::discriminant(&kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_and_env_vars_are_unique() {
        let paths: HashSet<_> = FIELDS.iter().map(|f| f.path).collect();
        let vars: HashSet<_> = FIELDS.iter().map(|f| f.env_var).collect();
        assert_eq!(paths.len(), FIELDS.len());
        assert_eq!(vars.len(), FIELDS.len());
    }

    #[test]
    fn test_no_field_is_a_section_of_another() {
        for outer in FIELDS {
            for inner in FIELDS {
                assert!(
                    !outer.key().is_prefix_of(&inner.key()),
                    "{} shadows {}",
                    outer.path,
                    inner.path
                );
            }
        }
    }

    #[test]
    fn test_lookup_by_path_and_env_var() {
        let field = ConfigurationSchema::field("external.openai.apiBase").unwrap();
        assert_eq!(field.env_var, "OPENAI_API_BASE");
        assert_eq!(field.field_type, FieldType::Url);

        let field = ConfigurationSchema::field_for_env_var("LOG_LEVEL").unwrap();
        assert_eq!(field.path, "devTools.logging.level");
        assert_eq!(field.allowed_values(), Some(LOG_LEVELS));

        assert!(ConfigurationSchema::field("base.nope").is_none());
        assert!(ConfigurationSchema::field_for_env_var("HOME").is_none());
    }

    #[test]
    fn test_accepts_leaves_and_sections() {
        assert!(ConfigurationSchema::accepts("base.port"));
        assert!(ConfigurationSchema::accepts("ui.window"));
        assert!(ConfigurationSchema::accepts("ui"));
        assert!(!ConfigurationSchema::accepts("ui.win"));
        assert!(!ConfigurationSchema::accepts("base.port.extra"));
        assert!(!ConfigurationSchema::accepts("unknown"));
    }

    #[test]
    fn test_required_fields() {
        let required: Vec<&str> = ConfigurationSchema::required().map(|f| f.path).collect();
        assert_eq!(
            required,
            vec![
                "base.appName",
                "base.appVersion",
                "base.nodeEnv",
                "base.environment"
            ]
        );
    }

    #[test]
    fn test_ports() {
        let ports: Vec<&str> = ConfigurationSchema::ports().map(|f| f.path).collect();
        assert_eq!(ports, vec!["base.port", "devTools.hmr.port"]);
    }

    #[test]
    fn test_of_type_enum_matches_all_enums() {
        let enums: Vec<&str> = ConfigurationSchema::of_type(FieldType::Enum(&[]))
            .map(|f| f.path)
            .collect();
        assert!(enums.contains(&"devTools.logging.level"));
        assert!(enums.contains(&"extensions.llamacpp.backend"));
        assert_eq!(enums.len(), 7);
    }

    #[test]
    fn test_ranges() {
        let width = ConfigurationSchema::field("ui.window.width").unwrap();
        assert_eq!(width.range, Some((200.0, 4000.0)));
        assert_eq!(ConfigurationSchema::ranged().count(), 8);
    }
}
