// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing source, parser and watcher implementations.
//!
//! This module contains concrete implementations of the traits defined in the ports
//! layer: dotenv files, the process environment, and (with the `reload` feature) a
//! file system watcher for the source directory.

pub mod env_file;
pub mod env_var;
pub mod watchers;

pub use env_file::{EnvFileAdapter, EnvFileParser};
pub use env_var::EnvVarAdapter;
#[cfg(feature = "reload")]
pub use watchers::EnvFileWatcher;
