// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module holds the schema, the built-in defaults, the coercion rules and the
//! path-addressed store. It performs no I/O; sources and services build on top of it.

pub mod coercion;
pub mod config_key;
pub mod config_value;
pub mod defaults;
pub mod environment;
pub mod errors;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use environment::{Environment, UnknownEnvironment};
pub use errors::{ConfigError, Result};
pub use schema::{ConfigurationSchema, FieldSpec, FieldType};
pub use store::ConfigStore;
