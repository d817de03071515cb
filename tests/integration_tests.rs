// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration manager.
//!
//! These tests drive loading, validation, runtime updates, export and reporting
//! through the public API against fixture directories.

use miaoda_config::prelude::*;
use miaoda_config::service::report::MASK;
use miaoda_config::service::{FileStatus, SourceStatus};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn fixture(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn manager_for(env: Environment, dir: &TempDir) -> ConfigManager {
    let mut manager = ConfigManager::builder()
        .environment(env)
        .root(dir.path())
        .without_process_env()
        .build();
    manager.load().unwrap();
    manager
}

#[test]
fn test_defaults_without_any_source() {
    let dir = fixture(&[]);
    let manager = manager_for(Environment::Production, &dir);

    assert_eq!(manager.require("base.appName").unwrap(), &ConfigValue::from("miaoda"));
    assert_eq!(manager.get("base.environment"), Some(&ConfigValue::from("production")));
    assert_eq!(manager.get("external.updater.disabled"), Some(&ConfigValue::Bool(false)));
    assert!(manager.raw_entries().is_empty());
    assert!(manager.validate().is_valid);
}

#[test]
fn test_require_rejects_null_fields() {
    let dir = fixture(&[]);
    let manager = manager_for(Environment::Development, &dir);

    assert!(matches!(
        manager.require("external.openai.apiKey"),
        Err(ConfigError::ConfigKeyNotFound { .. })
    ));
    assert!(manager.require("nope.nothing").is_err());
}

#[test]
fn test_coercion_through_the_pipeline() {
    let dir = fixture(&[(
        ".env.example",
        "IS_TAURI=TRUE\nDEBUG_MODE=0\nWINDOW_WIDTH=1280\nCOVERAGE_THRESHOLD=85.5\n\
         APP_VERSION=1.0\nCUSTOM_FLAG=true\nCUSTOM_COUNT=12\n",
    )]);
    let manager = manager_for(Environment::Development, &dir);

    assert_eq!(manager.get("base.isTauri"), Some(&ConfigValue::Bool(true)));
    assert_eq!(manager.get("devTools.debug.enabled"), Some(&ConfigValue::Bool(false)));
    assert_eq!(manager.get("ui.window.width"), Some(&ConfigValue::Integer(1280)));
    assert_eq!(manager.get("test.coverageThreshold"), Some(&ConfigValue::Float(85.5)));
    // declared as a string, so no numeric sniffing
    assert_eq!(manager.get("base.appVersion"), Some(&ConfigValue::from("1.0")));
    // undeclared keys only appear in the raw view
    assert_eq!(manager.raw("CUSTOM_FLAG"), Some(ConfigValue::Bool(true)));
    assert_eq!(manager.raw("CUSTOM_COUNT"), Some(ConfigValue::Integer(12)));
    assert_eq!(manager.raw("MISSING"), None);
}

#[test]
fn test_two_errors_and_a_warning() {
    let dir = fixture(&[(
        ".env.local",
        "PORT=0\nDEFAULT_THEME=neon\nMEMORY_LIMIT=64\n",
    )]);
    let manager = manager_for(Environment::Development, &dir);
    let result = manager.validate();

    assert!(!result.is_valid);
    let errors: Vec<&str> = result.errors.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(errors, vec!["base.port", "ui.theme.default"]);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].field, "performance.memoryLimit");
    assert_eq!(result.warnings[0].severity, Severity::Warning);
}

#[test]
fn test_missing_name_narrow_window_and_bad_log_level() {
    let dir = fixture(&[(".env.local", "WINDOW_WIDTH=100\nLOG_LEVEL=verbose\n")]);
    let mut manager = manager_for(Environment::Development, &dir);
    manager.set("base.appName", "").unwrap();
    let result = manager.validate();

    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].field, "base.appName");
    assert_eq!(result.errors[1].field, "devTools.logging.level");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].field, "ui.window.width");
    assert_eq!(manager.validate(), result);
}

#[test]
fn test_port_collision_reports_hmr_port() {
    let dir = fixture(&[(".env.local", "PORT=3000\nHMR_PORT=3000\n")]);
    let manager = manager_for(Environment::Development, &dir);
    let result = manager.validate();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "devTools.hmr.port");
}

#[test]
fn test_invalid_url_is_a_warning() {
    let dir = fixture(&[(".env.local", "POSTHOG_HOST=not a url\n")]);
    let manager = manager_for(Environment::Development, &dir);
    let result = manager.validate();

    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].field, "external.posthog.host");
}

#[test]
fn test_malformed_lines_are_reported_and_skipped() {
    let dir = fixture(&[(".env.local", "PORT=3000\nthis is not valid\nHMR_PORT=3001\n")]);
    let manager = manager_for(Environment::Development, &dir);

    assert_eq!(manager.get("base.port"), Some(&ConfigValue::Integer(3000)));
    assert!(!manager.issues().is_empty());
    assert_eq!(manager.issues()[0].source, ".env.local");
}

#[test]
fn test_dollar_signs_in_files_are_not_expanded() {
    std::env::set_var("MIAODA_IT_DOLLAR_TARGET", "leaked");
    let dir = fixture(&[
        (
            ".env.local",
            "PROXY_PASSWORD=pa$word\nAPP_NAME=Miao${MIAODA_IT_DOLLAR_TARGET}da\n",
        ),
        (".env.development", "OPENAI_API_KEY=\"sk-$MIAODA_IT_DOLLAR_TARGET\"\n"),
    ]);
    let manager = manager_for(Environment::Development, &dir);

    assert_eq!(manager.raw("PROXY_PASSWORD"), Some(ConfigValue::from("pa$word")));
    assert_eq!(
        manager.get("network.proxy.password"),
        Some(&ConfigValue::from("pa$word"))
    );
    assert_eq!(
        manager.get("base.appName"),
        Some(&ConfigValue::from("Miao${MIAODA_IT_DOLLAR_TARGET}da"))
    );
    assert_eq!(
        manager.raw_entries().get("OPENAI_API_KEY").map(String::as_str),
        Some("sk-$MIAODA_IT_DOLLAR_TARGET")
    );
    assert!(manager.issues().is_empty());
}

#[test]
fn test_invalid_utf8_line_does_not_drop_the_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".env.local"),
        b"WINDOW_WIDTH=1280\nBAD=\xff\nCACHE_SIZE=200\n",
    )
    .unwrap();
    let manager = manager_for(Environment::Development, &dir);

    assert_eq!(manager.raw("WINDOW_WIDTH"), Some(ConfigValue::Integer(1280)));
    assert_eq!(manager.raw("CACHE_SIZE"), Some(ConfigValue::Integer(200)));
    assert!(!manager.raw_entries().contains_key("BAD"));
    assert_eq!(manager.issues().len(), 1);
    assert_eq!(manager.issues()[0].line, Some(2));
}

#[test]
fn test_set_notifies_listeners_in_order_and_isolates_panics() {
    let dir = fixture(&[]);
    let mut manager = manager_for(Environment::Development, &dir);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let _boom = manager.subscribe(Arc::new(|_: &ChangeEvent| panic!("listener failure")));
    let recorder = Arc::clone(&seen);
    let _ok = manager.subscribe(Arc::new(move |e: &ChangeEvent| {
        recorder
            .lock()
            .unwrap()
            .push((e.key.to_string(), e.old_value.clone(), e.new_value.clone()));
    }));

    let old = manager.set("ui.theme.default", "dark").unwrap();
    assert_eq!(old, ConfigValue::from("light"));
    assert_eq!(manager.get("ui.theme.default"), Some(&ConfigValue::from("dark")));

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![(
            "ui.theme.default".to_string(),
            ConfigValue::from("light"),
            ConfigValue::from("dark")
        )]
    );
}

#[test]
fn test_set_rejects_unknown_paths() {
    let dir = fixture(&[]);
    let mut manager = manager_for(Environment::Development, &dir);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _sub = manager.subscribe(Arc::new(move |_: &ChangeEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(matches!(
        manager.set("base.nonexistent", 1),
        Err(ConfigError::UnknownKey { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let dir = fixture(&[]);
    let mut manager = manager_for(Environment::Development, &dir);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let sub = manager.subscribe(Arc::new(move |_: &ChangeEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    manager.set("base.port", 8080).unwrap();
    assert!(sub.unsubscribe());
    manager.set("base.port", 8081).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reload_discards_runtime_sets_and_picks_up_edits() {
    let dir = fixture(&[(".env.local", "PORT=3000\n")]);
    let mut manager = manager_for(Environment::Development, &dir);
    manager.set("base.port", 9999).unwrap();

    fs::write(dir.path().join(".env.local"), "PORT=3100\n").unwrap();
    manager.reload().unwrap();
    assert_eq!(manager.get("base.port"), Some(&ConfigValue::Integer(3100)));
}

#[test]
fn test_load_environment_switches() {
    let dir = fixture(&[(".env.production", "LOG_FILE=/var/log/miaoda.log\n")]);
    let mut manager = manager_for(Environment::Development, &dir);
    assert_eq!(manager.get("devTools.logging.file"), Some(&ConfigValue::Null));

    manager.load_environment(Environment::Production).unwrap();
    assert_eq!(manager.environment(), Environment::Production);
    assert_eq!(
        manager.get("devTools.logging.file"),
        Some(&ConfigValue::from("/var/log/miaoda.log"))
    );
    assert_eq!(manager.get("base.environment"), Some(&ConfigValue::from("production")));
}

#[test]
fn test_posture_advisories_for_production() {
    let dir = fixture(&[(".env.production", "DEBUG_MODE=true\n")]);
    let manager = manager_for(Environment::Production, &dir);

    let advisories = manager.posture();
    assert!(advisories.iter().any(|a| a.field == "devTools.debug.enabled"));
    // advisories never make the configuration invalid
    assert!(manager.validate().is_valid);
}

#[test]
fn test_export_masks_credentials() {
    let dir = fixture(&[(
        ".env.local",
        "OPENAI_API_KEY=sk-live-123\nGITHUB_TOKEN=ghp_abc\nERROR_TRACKING_DSN=https://x@sentry.io/1\n",
    )]);
    let manager = manager_for(Environment::Production, &dir);
    let json = manager.export(ExportFormat::Json).unwrap();

    assert!(!json.contains("sk-live-123"));
    assert!(!json.contains("ghp_abc"));
    assert!(!json.contains("sentry.io"));
    assert!(json.contains(MASK));

    // the manager itself still holds the real values
    assert_eq!(
        manager.get("external.openai.apiKey"),
        Some(&ConfigValue::from("sk-live-123"))
    );
}

#[test]
fn test_report_and_inventory() {
    let dir = fixture(&[
        (".env.example", "APP_NAME=miaoda\n"),
        (".env.development", ""),
        (".env.test", ""),
    ]);
    let loader = SourceLoader::new(dir.path()).without_process_env();

    let files = loader.inventory();
    let missing: Vec<&FileStatus> = files.iter().filter(|f| f.required && !f.exists).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].name, ".env.production");

    let report = ConfigReport::generate(&loader).unwrap();
    assert!(report.all_valid());
    assert_eq!(report.summary.total, 3);
    assert!(report
        .environments
        .values()
        .all(|r| r.errors.is_empty() && r.raw_keys == 1));
}

#[test]
fn test_source_summary_status() {
    let dir = fixture(&[(".env.example", "APP_NAME=miaoda\n")]);
    let loader = SourceLoader::new(dir.path()).without_process_env();
    let report = loader.load_sources(Environment::Development).unwrap();

    assert!(report.sources.iter().all(|s| s.status == SourceStatus::Loaded));
    assert_eq!(report.sources[0].entries, 1);
    assert_eq!(report.environment, Environment::Development);
}
