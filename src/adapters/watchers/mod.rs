// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for source change detection.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::EnvFileWatcher;
