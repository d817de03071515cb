// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Miaoda chat client.
//!
//! This crate resolves the client's configuration from built-in defaults, dotenv files
//! and the process environment, coerces raw strings to the types the schema declares,
//! validates the result, and notifies listeners when values change at runtime.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: The schema, defaults, coercion and the nested `ConfigStore`
//! - **Ports**: Trait definitions for raw sources, parsers, listeners and watchers
//! - **Adapters**: Dotenv files, the process environment, and a directory watcher
//! - **Service**: Loading, resolution, validation, notification and export
//!
//! # Precedence
//!
//! Later layers win: defaults, then `.env.example`, then `.env.<environment>`, then
//! `.env.local`, then the process environment. Extra sources join at their own
//! priority.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML export (default)
//! - `cli`: Build the `miaoda-config` command-line tool (default)
//! - `reload`: Enable watching the source directory for changes
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use miaoda_config::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let mut manager = ConfigManager::new(Environment::from_process());
//! manager.load()?;
//!
//! let result = manager.validate();
//! result.log();
//! if let Some(port) = manager.get("base.port") {
//!     println!("dev server port: {}", port);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ConfigError, ConfigKey, ConfigStore, ConfigValue, ConfigurationSchema, Environment,
        FieldType, Result,
    };
    pub use crate::ports::{ChangeEvent, ChangeListener, ConfigParser, ConfigSource, ConfigWatcher};
    pub use crate::service::{
        ConfigManager, ConfigReport, ExportFormat, Severity, SourceLoader, Subscription,
        ValidationResult, Validator,
    };

    pub use crate::adapters::{EnvFileAdapter, EnvVarAdapter};
    #[cfg(feature = "reload")]
    pub use crate::adapters::EnvFileWatcher;
}
