// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in defaults.
//!
//! Resolution starts from two layers that need no file access: the [`baseline`] for the
//! active environment, which holds a value (possibly `Null`) for every declared field, and
//! the environment [`overlay`], which adjusts the handful of settings that differ per
//! deployment target.

use crate::domain::config_value::ConfigValue;
use crate::domain::environment::Environment;
use crate::domain::schema::ConfigurationSchema;
use crate::domain::store::ConfigStore;

/// Application name used when no source overrides it.
pub const APP_NAME: &str = "miaoda";
/// Application version used when no source overrides it.
pub const APP_VERSION: &str = "0.6.599";

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const GROK_API_BASE: &str = "https://api.x.ai/v1";

/// Returns the baseline defaults for `env`.
///
/// Every field of the schema is present in the result; fields without a default hold
/// [`ConfigValue::Null`].
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::defaults::baseline;
/// use miaoda_config::domain::{ConfigValue, Environment};
///
/// let defaults = baseline(Environment::Production);
/// assert_eq!(defaults.get("base.port"), Some(&ConfigValue::Integer(1420)));
/// assert_eq!(defaults.get("external.openai.apiKey"), Some(&ConfigValue::Null));
/// ```
pub fn baseline(env: Environment) -> ConfigStore {
    let dev = env == Environment::Development;
    let prod = env == Environment::Production;

    let mut store: ConfigStore = ConfigurationSchema::fields()
        .iter()
        .map(|f| (f.path, ConfigValue::Null))
        .collect();

    let values: Vec<(&str, ConfigValue)> = vec![
        ("base.appName", APP_NAME.into()),
        ("base.appVersion", APP_VERSION.into()),
        ("base.environment", env.as_str().into()),
        ("base.nodeEnv", env.as_str().into()),
        ("base.port", 1420.into()),
        ("base.tauriDevHost", "localhost".into()),
        ("base.isTauri", false.into()),
        ("base.isClean", false.into()),
        ("external.posthog.host", "https://app.posthog.com".into()),
        (
            "external.modelCatalogUrl",
            "https://raw.githubusercontent.com/miounet11/miaoda/main/model_catalog.json".into(),
        ),
        ("external.openai.apiBase", OPENAI_API_BASE.into()),
        ("external.openai.model", "gpt-3.5-turbo".into()),
        ("external.grok.apiBase", GROK_API_BASE.into()),
        ("external.grok.model", "grok-3".into()),
        ("external.updater.disabled", (!prod).into()),
        (
            "external.updater.endpoint",
            "https://github.com/miounet11/miaoda/releases/latest/download/latest.json".into(),
        ),
        ("ui.theme.default", "light".into()),
        ("ui.theme.syncOS", true.into()),
        ("ui.locale.default", "zh-CN".into()),
        ("ui.locale.fallback", "en-US".into()),
        ("ui.window.width", 1024.into()),
        ("ui.window.height", 800.into()),
        ("ui.window.minWidth", 375.into()),
        ("ui.window.minHeight", 667.into()),
        ("devTools.logging.level", if dev { "debug" } else { "info" }.into()),
        ("devTools.logging.enableConsole", dev.into()),
        ("devTools.debug.enabled", dev.into()),
        ("devTools.debug.enableDevTools", dev.into()),
        ("devTools.hmr.enabled", dev.into()),
        ("devTools.hmr.port", 1421.into()),
        ("devTools.quality.eslint", true.into()),
        ("devTools.quality.prettier", true.into()),
        ("devTools.quality.typeCheck", true.into()),
        ("build.bundleAnalyzer", false.into()),
        ("build.sourceMaps", dev.into()),
        ("build.chunkSizeLimit", 1000.into()),
        ("network.networkTimeout", 30000.into()),
        ("network.requestTimeout", 10000.into()),
        ("performance.cpuThreads", 0.into()),
        ("performance.cacheSize", 100.into()),
        ("extensions.mcp.enabled", true.into()),
        ("extensions.mcp.autoInstall", prod.into()),
        ("extensions.llamacpp.backend", "auto".into()),
        ("extensions.llamacpp.threads", 0.into()),
        ("extensions.llamacpp.gpuLayers", (-1).into()),
        ("test.timeout", 30000.into()),
        ("test.coverageThreshold", if prod { 80.0 } else { 70.0 }.into()),
        ("test.enableE2E", (!prod).into()),
        ("test.reportPortal.enabled", false.into()),
        ("test.reportPortal.project", "miaoda".into()),
        ("test.reportPortal.launch", "miaoda-tests".into()),
        ("monitoring.performance.enabled", prod.into()),
        ("monitoring.errorTracking.enabled", prod.into()),
        ("monitoring.analytics.enabled", prod.into()),
        ("cicd.github.releaseDraft", false.into()),
        ("cicd.github.releasePrerelease", false.into()),
    ];

    for (path, value) in values {
        store.set(path, value);
    }
    store
}

/// Returns the overlay applied on top of the baseline for `env`.
///
/// The overlay only holds the settings that differ per environment.
pub fn overlay(env: Environment) -> ConfigStore {
    let mut values: Vec<(&str, ConfigValue)> = vec![
        ("devTools.hmr.port", 1421.into()),
        ("external.openai.apiBase", OPENAI_API_BASE.into()),
        ("external.openai.model", "gpt-4".into()),
        ("external.grok.apiBase", GROK_API_BASE.into()),
        ("external.grok.model", "grok-3".into()),
    ];

    match env {
        Environment::Development => values.extend([
            ("devTools.logging.level", "debug".into()),
            ("devTools.logging.enableConsole", true.into()),
            ("devTools.debug.enabled", true.into()),
            ("devTools.debug.enableDevTools", true.into()),
            ("devTools.hmr.enabled", true.into()),
            ("devTools.quality.eslint", true.into()),
            ("devTools.quality.prettier", true.into()),
            ("devTools.quality.typeCheck", true.into()),
            ("external.updater.disabled", true.into()),
            ("build.sourceMaps", true.into()),
            ("build.bundleAnalyzer", false.into()),
            ("build.chunkSizeLimit", 2000.into()),
        ]),
        Environment::Test => values.extend([
            ("devTools.logging.level", "warn".into()),
            ("devTools.logging.enableConsole", false.into()),
            ("devTools.debug.enabled", false.into()),
            ("devTools.debug.enableDevTools", false.into()),
            ("devTools.hmr.enabled", false.into()),
            ("devTools.quality.eslint", true.into()),
            ("devTools.quality.prettier", false.into()),
            ("devTools.quality.typeCheck", true.into()),
            ("external.updater.disabled", true.into()),
            ("extensions.mcp.enabled", false.into()),
            ("extensions.mcp.autoInstall", false.into()),
            ("extensions.llamacpp.backend", "auto".into()),
            ("extensions.llamacpp.threads", 4.into()),
            ("extensions.llamacpp.gpuLayers", 0.into()),
            ("test.enableE2E", true.into()),
            ("test.coverageThreshold", 80.0.into()),
            ("test.timeout", 30000.into()),
        ]),
        Environment::Production => values.extend([
            ("devTools.logging.level", "info".into()),
            ("devTools.logging.enableConsole", false.into()),
            ("devTools.debug.enabled", false.into()),
            ("devTools.debug.enableDevTools", false.into()),
            ("devTools.hmr.enabled", false.into()),
            ("devTools.quality.eslint", false.into()),
            ("devTools.quality.prettier", false.into()),
            ("devTools.quality.typeCheck", false.into()),
            ("external.updater.disabled", false.into()),
            ("build.sourceMaps", false.into()),
            ("build.bundleAnalyzer", false.into()),
            ("build.chunkSizeLimit", 1000.into()),
            ("monitoring.performance.enabled", true.into()),
            ("monitoring.errorTracking.enabled", true.into()),
            ("monitoring.analytics.enabled", true.into()),
        ]),
    }

    values.into_iter().collect()
}

/// Returns the baseline for `env` with its overlay merged on top.
pub fn resolved_defaults(env: Environment) -> ConfigStore {
    let mut store = baseline(env);
    store.merge(&overlay(env));
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_covers_every_field() {
        for env in Environment::ALL {
            let store = baseline(env);
            for field in ConfigurationSchema::fields() {
                assert!(
                    store.get(field.path).is_some(),
                    "{} missing from {} baseline",
                    field.path,
                    env
                );
            }
        }
    }

    #[test]
    fn test_baseline_tracks_environment() {
        let store = baseline(Environment::Test);
        assert_eq!(store.get("base.environment"), Some(&ConfigValue::from("test")));
        assert_eq!(store.get("base.nodeEnv"), Some(&ConfigValue::from("test")));
    }

    #[test]
    fn test_overlay_only_touches_declared_fields() {
        for env in Environment::ALL {
            for (key, _) in overlay(env).leaves() {
                assert!(
                    ConfigurationSchema::field(key.as_str()).is_some(),
                    "{} overlay sets undeclared {}",
                    env,
                    key
                );
            }
        }
    }

    #[test]
    fn test_overlay_values() {
        let dev = resolved_defaults(Environment::Development);
        assert_eq!(dev.get("build.chunkSizeLimit"), Some(&ConfigValue::Integer(2000)));
        assert_eq!(dev.get("external.openai.model"), Some(&ConfigValue::from("gpt-4")));

        let test = resolved_defaults(Environment::Test);
        assert_eq!(test.get("devTools.logging.level"), Some(&ConfigValue::from("warn")));
        assert_eq!(test.get("extensions.mcp.enabled"), Some(&ConfigValue::Bool(false)));
        assert_eq!(test.get("extensions.llamacpp.threads"), Some(&ConfigValue::Integer(4)));

        let prod = resolved_defaults(Environment::Production);
        assert_eq!(prod.get("external.updater.disabled"), Some(&ConfigValue::Bool(false)));
        assert_eq!(prod.get("devTools.quality.eslint"), Some(&ConfigValue::Bool(false)));
        assert_eq!(
            prod.get("monitoring.analytics.enabled"),
            Some(&ConfigValue::Bool(true))
        );
    }

    #[test]
    fn test_coverage_threshold_is_float() {
        let store = baseline(Environment::Development);
        assert_eq!(
            store.get("test.coverageThreshold"),
            Some(&ConfigValue::Float(70.0))
        );
    }
}
