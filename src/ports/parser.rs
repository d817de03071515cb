// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which turns the content of a
//! configuration file into flat `KEY=value` entries.

use crate::ports::source::SourceLoad;

/// A trait for parsing configuration files.
///
/// Parsing is lenient: a line the parser cannot understand is skipped and reported in
/// [`SourceLoad::issues`] rather than failing the whole file. `source_name` is only used
/// to label those issues.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::ports::{ConfigParser, SourceLoad};
///
/// struct ColonParser;
///
/// impl ConfigParser for ColonParser {
///     fn parse(&self, _source_name: &str, content: &str) -> SourceLoad {
///         let entries = content
///             .lines()
///             .filter_map(|l| l.split_once(':'))
///             .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
///             .collect();
///         SourceLoad::from_entries(entries)
///     }
/// }
///
/// let load = ColonParser.parse("inline", "APP_NAME: miaoda");
/// assert_eq!(load.entries[0].1, "miaoda");
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses `content` into entries, in file order.
    fn parse(&self, source_name: &str, content: &str) -> SourceLoad;
}
