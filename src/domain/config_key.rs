// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype for dotted configuration paths.
//!
//! This module provides the `ConfigKey` type, a newtype wrapper around `String` that
//! names a location in the configuration tree (`external.openai.apiBase`) and knows how
//! to split itself into path segments.

use std::fmt;

/// A dotted path into the configuration tree.
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("ui.window.width");
/// assert_eq!(key.as_str(), "ui.window.width");
/// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["ui", "window", "width"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns the last segment of the path (the field name).
    ///
    /// ```
    /// use miaoda_config::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("cicd.github.token").leaf(), "token");
    /// assert_eq!(ConfigKey::from("plain").leaf(), "plain");
    /// ```
    pub fn leaf(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Returns `true` if `self` is a strict section prefix of `other`.
    ///
    /// `ui.window` is a prefix of `ui.window.width`, but `ui.win` is not.
    pub fn is_prefix_of(&self, other: &ConfigKey) -> bool {
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for ConfigKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
