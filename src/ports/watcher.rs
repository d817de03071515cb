// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source watcher trait definition.
//!
//! This module defines the `ConfigWatcher` trait, which monitors configuration sources
//! and signals when a reload is due. Watchers never touch the resolved configuration
//! themselves; the callback decides what to do.

use crate::domain::Result;
use std::sync::Arc;

/// Callback invoked with the name of the source that changed (e.g. `.env.local`).
pub type ReloadCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A trait for watching configuration sources for changes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; callbacks usually run on a background thread.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::ports::{ConfigWatcher, ReloadCallback};
/// use miaoda_config::domain::Result;
///
/// struct Manual {
///     callback: Option<ReloadCallback>,
/// }
///
/// impl ConfigWatcher for Manual {
///     fn watch(&mut self, callback: ReloadCallback) -> Result<()> {
///         self.callback = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.callback = None;
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigWatcher: Send + Sync {
    /// Starts watching; `callback` fires once per detected change.
    fn watch(&mut self, callback: ReloadCallback) -> Result<()>;

    /// Stops watching. No callback fires after this returns.
    fn stop(&mut self) -> Result<()>;
}
