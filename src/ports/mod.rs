// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) for raw sources, file parsers,
//! change listeners and source watchers. Adapters implement them.

pub mod listener;
pub mod parser;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use listener::{ChangeEvent, ChangeListener};
pub use parser::ConfigParser;
pub use source::{ConfigSource, LoadIssue, RawEntry, SourceLoad};
pub use watcher::{ConfigWatcher, ReloadCallback};
