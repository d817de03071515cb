// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests use property-based testing to verify that coercion, the store,
//! source precedence and validation hold up under arbitrary inputs.

use miaoda_config::domain::coercion::{coerce, coerce_as, sniff};
use miaoda_config::domain::defaults::resolved_defaults;
use miaoda_config::domain::{ConfigKey, ConfigStore, ConfigValue, Environment, FieldType};
use miaoda_config::service::{ConfigManager, Validator};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn env_strategy() -> impl Strategy<Value = Environment> {
    prop_oneof![
        Just(Environment::Development),
        Just(Environment::Test),
        Just(Environment::Production),
    ]
}

// Test that a ConfigKey keeps any string
proptest! {
    #[test]
    fn test_config_key_from_any_string(s in "\\PC*") {
        let key = ConfigKey::from(s.clone());
        prop_assert_eq!(key.as_str(), s.as_str());
    }
}

fn scalar_strategy() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        Just(ConfigValue::Null),
        any::<bool>().prop_map(ConfigValue::Bool),
        any::<i64>().prop_map(ConfigValue::Integer),
        prop::num::f64::NORMAL.prop_map(ConfigValue::Float),
        "\\PC{0,16}".prop_map(ConfigValue::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = ConfigValue> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(ConfigValue::Map)
    })
}

fn count_leaves(value: &ConfigValue) -> usize {
    match value {
        ConfigValue::Map(map) if !map.is_empty() => map.values().map(count_leaves).sum(),
        _ => 1,
    }
}

// Test that a value of any shape written at a path reads back unchanged
proptest! {
    #[test]
    fn test_store_set_then_get(
        path in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
        value in value_strategy(),
    ) {
        let mut store = ConfigStore::new();
        store.set(&path, value.clone());
        prop_assert_eq!(store.get(&path), Some(&value));

        let leaves = store.leaves();
        prop_assert_eq!(leaves.len(), count_leaves(&value));
        for (key, _) in &leaves {
            prop_assert!(key.as_str().starts_with(path.as_str()));
        }
    }
}

// Test that merging a store into itself changes nothing
proptest! {
    #[test]
    fn test_merge_is_idempotent(env in env_strategy()) {
        let defaults = resolved_defaults(env);
        let mut merged = defaults.clone();
        merged.merge(&defaults);
        prop_assert_eq!(merged, defaults);
    }
}

// Test that every i64 survives integer coercion
proptest! {
    #[test]
    fn test_integer_coercion_valid(n in prop::num::i64::ANY) {
        prop_assert_eq!(coerce_as(FieldType::Integer, &n.to_string()), ConfigValue::Integer(n));
    }
}

// Test that integers past the i64 range stay strings
proptest! {
    #[test]
    fn test_integer_coercion_overflow(n in (i64::MAX as u64 + 1)..=u64::MAX) {
        let raw = n.to_string();
        prop_assert_eq!(coerce_as(FieldType::Integer, &raw), ConfigValue::from(raw.as_str()));
    }
}

// Test that non-numeric text is never turned into a number
proptest! {
    #[test]
    fn test_integer_coercion_non_numeric(s in "[a-zA-Z][a-zA-Z0-9 ]*") {
        prop_assert_eq!(coerce_as(FieldType::Integer, &s), ConfigValue::from(s.as_str()));
    }
}

// Test boolean coercion with known literals in any case
proptest! {
    #[test]
    fn test_boolean_coercion_literals(b in prop::bool::ANY, upper in prop::bool::ANY) {
        let raw = if b { "true" } else { "false" };
        let raw = if upper { raw.to_uppercase() } else { raw.to_string() };
        prop_assert_eq!(coerce("DEBUG_MODE", &raw), ConfigValue::Bool(b));
        prop_assert_eq!(sniff(&raw), ConfigValue::Bool(b));
    }
}

// Test that string fields never change their raw text
proptest! {
    #[test]
    fn test_string_fields_pass_through(s in "[ -~]{1,40}") {
        prop_assert_eq!(coerce("APP_VERSION", &s), ConfigValue::from(s.as_str()));
    }
}

// Test that the highest layer always wins
proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_highest_layer_wins(
        template in 1u16..60000,
        env_file in 1u16..60000,
        local in 1u16..60000,
        process in 1u16..60000,
        layers in 0usize..5,
    ) {
        let dir = TempDir::new().unwrap();
        let mut expected = 1420i64;
        let mut process_env: Vec<(String, String)> = Vec::new();

        if layers >= 1 {
            fs::write(dir.path().join(".env.example"), format!("PORT={}\n", template)).unwrap();
            expected = i64::from(template);
        }
        if layers >= 2 {
            fs::write(dir.path().join(".env.test"), format!("PORT={}\n", env_file)).unwrap();
            expected = i64::from(env_file);
        }
        if layers >= 3 {
            fs::write(dir.path().join(".env.local"), format!("PORT={}\n", local)).unwrap();
            expected = i64::from(local);
        }
        if layers >= 4 {
            process_env.push(("PORT".to_string(), process.to_string()));
            expected = i64::from(process);
        }

        let mut manager = ConfigManager::builder()
            .environment(Environment::Test)
            .root(dir.path())
            .process_env(process_env)
            .build();
        manager.load().unwrap();

        prop_assert_eq!(manager.get("base.port"), Some(&ConfigValue::Integer(expected)));
    }
}

// Test that validation is deterministic
proptest! {
    #[test]
    fn test_validation_is_idempotent(
        env in env_strategy(),
        width in prop::num::i64::ANY,
        port in "[0-9a-z]{0,6}",
        theme in "[a-z]{0,6}",
    ) {
        let raw: BTreeMap<String, String> = [
            ("WINDOW_WIDTH".to_string(), width.to_string()),
            ("PORT".to_string(), port),
            ("DEFAULT_THEME".to_string(), theme),
        ]
        .into_iter()
        .collect();
        let config = ConfigManager::resolve(env, &raw);

        let first = Validator.validate(&config);
        let second = Validator.validate(&config);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.is_valid, first.errors.is_empty());
    }
}

// Test that resolving an empty raw map yields the defaults
proptest! {
    #[test]
    fn test_resolve_without_sources_is_defaults(env in env_strategy()) {
        let config = ConfigManager::resolve(env, &BTreeMap::new());
        prop_assert_eq!(config, resolved_defaults(env));
    }
}
