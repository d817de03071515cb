// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change listener definitions.
//!
//! A [`ChangeEvent`] is published for every runtime `set` on the configuration manager.

use crate::domain::{ConfigKey, ConfigValue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A runtime mutation of one configuration path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// The path that was written.
    pub key: ConfigKey,
    /// The value before the write (`Null` if there was none).
    pub old_value: ConfigValue,
    /// The value after the write.
    pub new_value: ConfigValue,
    /// When the write happened.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Creates an event stamped with the current time.
    pub fn new(key: impl Into<ConfigKey>, old_value: ConfigValue, new_value: ConfigValue) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }

    /// Returns `true` if the write changed the value.
    pub fn is_change(&self) -> bool {
        self.old_value != self.new_value
    }
}

/// Callback invoked synchronously for each [`ChangeEvent`].
///
/// # Examples
///
/// ```rust
/// use miaoda_config::ports::{ChangeEvent, ChangeListener};
/// use std::sync::Arc;
///
/// let listener: ChangeListener = Arc::new(|event: &ChangeEvent| {
///     println!("{} changed to {}", event.key, event.new_value);
/// });
/// ```
pub type ChangeListener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;
