// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path-addressed configuration store.
//!
//! `ConfigStore` is a nested tree of [`ConfigValue`]s addressed by dotted paths. It knows
//! nothing about the schema: any path can be written, and writing through a leaf
//! replaces that leaf with a fresh section. Schema checks happen in the configuration
//! manager.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::ConfigValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// A nested configuration tree addressed by dotted paths.
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::{ConfigStore, ConfigValue};
///
/// let mut store = ConfigStore::new();
/// store.set("ui.window.width", 1024);
/// assert_eq!(store.get("ui.window.width"), Some(&ConfigValue::Integer(1024)));
/// assert!(store.get("ui.window.height").is_none());
/// assert!(store.get("ui.window").unwrap().is_map());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigStore {
    root: BTreeMap<String, ConfigValue>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `path`, or `None` if any segment is missing or is not a section.
    pub fn get(&self, path: impl AsRef<str>) -> Option<&ConfigValue> {
        let mut segments = path.as_ref().split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns `true` if a non-null value is stored at `path`.
    pub fn contains(&self, path: impl AsRef<str>) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    /// Stores `value` at `path` and returns the previous value, if any.
    ///
    /// Missing intermediate sections are created. An intermediate segment holding a
    /// scalar is replaced by an empty section.
    pub fn set(&mut self, path: impl AsRef<str>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        let path = path.as_ref();
        let value = value.into();
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut current = &mut self.root;
        if let Some(parents) = parents {
            for segment in parents.split('.') {
                let entry = current
                    .entry(segment.to_string())
                    .or_insert_with(ConfigValue::empty_map);
                if !entry.is_map() {
                    tracing::debug!(
                        "Replacing scalar at segment '{}' of '{}' with a section",
                        segment,
                        path
                    );
                    *entry = ConfigValue::empty_map();
                }
                current = match entry {
                    ConfigValue::Map(map) => map,
                    _ => unreachable!("entry was just made a map"),
                };
            }
        }

        current.insert(leaf.to_string(), value)
    }

    /// Merges `other` into `self`; leaves from `other` win, sections merge recursively.
    pub fn merge(&mut self, other: &ConfigStore) {
        merge_maps(&mut self.root, &other.root);
    }

    /// Returns every leaf (non-section value) with its dotted path, in path order.
    pub fn leaves(&self) -> Vec<(ConfigKey, &ConfigValue)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, "", &mut out);
        out
    }

    /// Returns `true` if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the whole tree as a single section value.
    pub fn to_value(&self) -> ConfigValue {
        ConfigValue::Map(self.root.clone())
    }

    /// Builds a store from a section value; any other value yields an empty store.
    pub fn from_value(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Map(root) => Self { root },
            _ => Self::default(),
        }
    }
}

impl<K: AsRef<str>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = ConfigStore::new();
        for (path, value) in iter {
            store.set(path, value);
        }
        store
    }
}

fn merge_maps(target: &mut BTreeMap<String, ConfigValue>, source: &BTreeMap<String, ConfigValue>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(ConfigValue::Map(existing)), ConfigValue::Map(incoming)) => {
                merge_maps(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn collect_leaves<'a>(
    map: &'a BTreeMap<String, ConfigValue>,
    prefix: &str,
    out: &mut Vec<(ConfigKey, &'a ConfigValue)>,
) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            ConfigValue::Map(inner) if !inner.is_empty() => collect_leaves(inner, &path, out),
            _ => out.push((ConfigKey::from(path), value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = ConfigStore::new();
        assert_eq!(store.set("base.port", 1420), None);
        assert_eq!(store.get("base.port"), Some(&ConfigValue::Integer(1420)));
    }

    #[test]
    fn test_set_returns_previous() {
        let mut store = ConfigStore::new();
        store.set("base.port", 1420);
        let old = store.set("base.port", 8080);
        assert_eq!(old, Some(ConfigValue::Integer(1420)));
    }

    #[test]
    fn test_get_through_missing_segment() {
        let store = ConfigStore::new();
        assert!(store.get("a.b.c").is_none());
        assert!(store.get("").is_none());
    }

    #[test]
    fn test_get_through_scalar() {
        let mut store = ConfigStore::new();
        store.set("base.port", 1420);
        assert!(store.get("base.port.inner").is_none());
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut store = ConfigStore::new();
        store.set("base.port", 1420);
        store.set("base.port.inner", "x");
        assert_eq!(store.get("base.port.inner"), Some(&ConfigValue::from("x")));
        assert!(store.get("base.port").unwrap().is_map());
    }

    #[test]
    fn test_set_null_round_trips() {
        let mut store = ConfigStore::new();
        store.set("external.openai.apiKey", "sk-test");
        store.set("external.openai.apiKey", ConfigValue::Null);
        assert_eq!(store.get("external.openai.apiKey"), Some(&ConfigValue::Null));
        assert!(!store.contains("external.openai.apiKey"));
    }

    #[test]
    fn test_set_nested_map() {
        let mut store = ConfigStore::new();
        let window: ConfigStore = [("width", 800), ("height", 600)].into_iter().collect();
        store.set("ui.window", window.to_value());
        assert_eq!(store.get("ui.window.width"), Some(&ConfigValue::Integer(800)));
        assert_eq!(store.get("ui.window"), Some(&window.to_value()));
    }

    #[test]
    fn test_merge_overlay_wins_and_keeps_siblings() {
        let mut base: ConfigStore = [
            ("devTools.logging.level", ConfigValue::from("debug")),
            ("devTools.logging.enableConsole", ConfigValue::from(true)),
        ]
        .into_iter()
        .collect();
        let overlay: ConfigStore = [("devTools.logging.level", "warn")].into_iter().collect();

        base.merge(&overlay);
        assert_eq!(
            base.get("devTools.logging.level"),
            Some(&ConfigValue::from("warn"))
        );
        assert_eq!(
            base.get("devTools.logging.enableConsole"),
            Some(&ConfigValue::Bool(true))
        );
    }

    #[test]
    fn test_leaves_are_sorted_paths() {
        let store: ConfigStore = [("b.y", 2), ("a", 1), ("b.x", 3)].into_iter().collect();
        let paths: Vec<String> = store
            .leaves()
            .into_iter()
            .map(|(k, _)| k.into_string())
            .collect();
        assert_eq!(paths, vec!["a", "b.x", "b.y"]);
    }

    #[test]
    fn test_serializes_as_tree() {
        let store: ConfigStore = [("base.port", 1420)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&store).unwrap(),
            r#"{"base":{"port":1420}}"#
        );
    }

    #[test]
    fn test_from_value_round_trip() {
        let store: ConfigStore = [("ui.theme.default", "dark")].into_iter().collect();
        assert_eq!(ConfigStore::from_value(store.to_value()), store);
        assert!(ConfigStore::from_value(ConfigValue::from(1)).is_empty());
    }
}
