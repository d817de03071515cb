// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! This module defines the `ConfigSource` trait, the port every raw configuration source
//! implements. A source produces flat `KEY=value` string pairs; typing and nesting happen
//! later, against the schema.

use crate::domain::Result;
use serde::Serialize;
use std::fmt;

/// Priority of the `.env.example` template.
pub const TEMPLATE_PRIORITY: u8 = 0;
/// Priority of the `.env.<environment>` file.
pub const ENVIRONMENT_FILE_PRIORITY: u8 = 1;
/// Priority of the `.env.local` override.
pub const LOCAL_FILE_PRIORITY: u8 = 2;
/// Priority of the live process environment.
pub const PROCESS_ENV_PRIORITY: u8 = 3;

/// A single `(key, value)` pair produced by a source.
pub type RawEntry = (String, String);

/// A non-fatal problem encountered while reading a source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    /// Name of the source that reported the issue.
    pub source: String,
    /// Human-readable description.
    pub message: String,
    /// 1-based line number, when the issue concerns a specific line.
    pub line: Option<usize>,
}

impl LoadIssue {
    /// Creates an issue that is not tied to a line.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Attaches a line number.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.source, line, self.message),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}

/// What a source produced on one load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLoad {
    /// Entries in the order the source yielded them.
    pub entries: Vec<RawEntry>,
    /// Lines or values the source skipped.
    pub issues: Vec<LoadIssue>,
}

impl SourceLoad {
    /// Creates a load result holding only entries.
    pub fn from_entries(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            issues: Vec::new(),
        }
    }
}

/// A trait for raw configuration sources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a loader can be shared.
///
/// # Priority
///
/// Sources are merged in ascending priority; a key from a higher-priority source
/// overwrites the same key from every lower one. The built-in sources use:
///
/// - **3 (highest)**: process environment
/// - **2**: `.env.local`
/// - **1**: `.env.<environment>`
/// - **0 (lowest)**: `.env.example`
///
/// Sources with equal priority are merged in registration order.
///
/// # Errors
///
/// A source that does not exist yet (an absent optional file) returns an empty
/// [`SourceLoad`]. `Err` is reserved for sources that exist but cannot be read.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::ports::{ConfigSource, SourceLoad};
/// use miaoda_config::domain::Result;
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn priority(&self) -> u8 {
///         1
///     }
///
///     fn load(&self) -> Result<SourceLoad> {
///         Ok(SourceLoad::from_entries(vec![(
///             "APP_NAME".to_string(),
///             "miaoda".to_string(),
///         )]))
///     }
/// }
///
/// let load = Fixed.load().unwrap();
/// assert_eq!(load.entries.len(), 1);
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns a short identifier used in logs and issues, such as `.env.local`.
    fn name(&self) -> &str;

    /// Returns the merge priority of this source.
    fn priority(&self) -> u8;

    /// Reads the source.
    fn load(&self) -> Result<SourceLoad>;
}
