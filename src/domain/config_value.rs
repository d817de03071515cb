// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration values.
//!
//! This module provides the `ConfigValue` type. Raw sources only ever produce strings;
//! the coercion engine turns them into the typed variants below, and the path-addressed
//! store nests them into maps. The typed accessors return errors that name the key being
//! read, so callers can surface a precise message.

use crate::domain::errors::{ConfigError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A typed configuration value.
///
/// `Null` is the explicit "absent" marker: a declared field that neither a default nor a
/// source provides still exists in the resolved tree, but holds `Null`.
///
/// # Examples
///
/// ```
/// use miaoda_config::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::from(42);
/// assert_eq!(value.as_i64("base.port").unwrap(), 42);
/// assert!(ConfigValue::Null.is_null());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum ConfigValue {
    /// No value.
    #[default]
    Null,
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string, including values that failed coercion.
    String(String),
    /// A nested section keyed by path segment.
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Returns an empty nested section.
    pub fn empty_map() -> Self {
        ConfigValue::Map(BTreeMap::new())
    }

    /// Returns `true` for the absent marker.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns `true` for nested sections.
    pub fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    /// Returns `true` when the value counts as "set": not `Null` and not an empty string.
    pub fn is_present(&self) -> bool {
        match self {
            ConfigValue::Null => false,
            ConfigValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Returns a short name for the variant, used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Map(_) => "map",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested section if this is a map value.
    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns a numeric view of integer and float values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(n) => Some(*n as f64),
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Converts the value to a boolean.
    ///
    /// Only `Bool` values convert; a pass-through string such as `"maybe"` is reported as
    /// a type conversion error for `key`.
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(ConfigError::type_mismatch(key, "boolean", other.type_name())),
        }
    }

    /// Converts the value to an `i64`.
    ///
    /// Numeric strings are accepted, so a port that arrived untyped still converts.
    ///
    /// ```
    /// use miaoda_config::domain::config_value::ConfigValue;
    ///
    /// assert_eq!(ConfigValue::from("8080").as_i64("base.port").unwrap(), 8080);
    /// assert!(ConfigValue::from("eighty").as_i64("base.port").is_err());
    /// ```
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        match self {
            ConfigValue::Integer(n) => Ok(*n),
            ConfigValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e)),
            other => Err(ConfigError::type_mismatch(key, "integer", other.type_name())),
        }
    }

    /// Converts the value to an `f64`.
    pub fn as_f64(&self, key: &str) -> Result<f64> {
        match self {
            ConfigValue::Integer(n) => Ok(*n as f64),
            ConfigValue::Float(f) => Ok(*f),
            ConfigValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::from_parse_float_error(key.to_string(), e)),
            other => Err(ConfigError::type_mismatch(key, "float", other.type_name())),
        }
    }

    /// Returns the value as an owned string, rendering scalars in their display form.
    pub fn as_string(&self, key: &str) -> Result<String> {
        match self {
            ConfigValue::Null => Err(ConfigError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
            ConfigValue::Map(_) => Err(ConfigError::type_mismatch(key, "string", "map")),
            other => Ok(other.to_string()),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Integer(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Integer(i64::from(n))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::Null, Into::into)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "undefined"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(n) => write!(f, "{}", n),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => write!(f, "{}", s),
            ConfigValue::Map(map) => {
                // Compact single-line JSON is good enough for log lines.
                match serde_json::to_string(map) {
                    Ok(json) => write!(f, "{}", json),
                    Err(_) => write!(f, "{{...}}"),
                }
            }
        }
    }
}
