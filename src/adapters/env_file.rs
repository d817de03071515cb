// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotenv file configuration source adapter.
//!
//! This module provides an adapter that reads `KEY=value` entries from dotenv-style
//! files such as `.env.example` or `.env.production`.

use crate::domain::{ConfigError, Result};
use crate::ports::{ConfigParser, ConfigSource, LoadIssue, SourceLoad};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maximum allowed size for an env file (1MB).
const MAX_ENV_FILE_SIZE: u64 = 1024 * 1024;

/// Dotenv parser backed by `dotenvy`.
///
/// Understands comments, blank lines, single and double quotes and `export` prefixes.
/// Values are taken literally: `$NAME` and `${NAME}` are never expanded, in or out of
/// quotes. Lines it cannot parse are reported and skipped.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::adapters::EnvFileParser;
/// use miaoda_config::ports::ConfigParser;
///
/// let load = EnvFileParser.parse(".env", "# comment\nAPP_NAME=\"miaoda\"\nexport PORT=1420\n");
/// assert_eq!(
///     load.entries,
///     vec![
///         ("APP_NAME".to_string(), "miaoda".to_string()),
///         ("PORT".to_string(), "1420".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvFileParser;

impl ConfigParser for EnvFileParser {
    fn parse(&self, source_name: &str, content: &str) -> SourceLoad {
        let mut load = SourceLoad::default();
        let literal = escape_substitutions(content);
        let escaped_lines: Vec<&str> = literal.lines().collect();
        let original_lines: Vec<&str> = content.lines().collect();
        let mut cursor = 0;

        for item in dotenvy::from_read_iter(literal.as_bytes()) {
            match item {
                Ok(entry) => load.entries.push(entry),
                Err(dotenvy::Error::LineParse(text, position)) => {
                    let first = text.lines().next().unwrap_or_default().trim_end();
                    let found = escaped_lines[cursor..]
                        .iter()
                        .position(|l| l.trim_end() == first)
                        .map(|offset| cursor + offset);
                    let shown = found
                        .and_then(|i| original_lines.get(i).copied())
                        .unwrap_or(first);
                    let mut issue = LoadIssue::new(
                        source_name,
                        format!("skipped malformed line '{}' (error at column {})", shown, position),
                    );
                    if let Some(index) = found {
                        cursor = index + 1;
                        issue = issue.at_line(cursor);
                    }
                    tracing::warn!("{}", issue);
                    load.issues.push(issue);
                }
                Err(dotenvy::Error::Io(e)) => {
                    let issue = LoadIssue::new(source_name, format!("read failed: {}", e));
                    tracing::warn!("{}", issue);
                    load.issues.push(issue);
                    break;
                }
                Err(e) => {
                    let issue = LoadIssue::new(source_name, e.to_string());
                    tracing::warn!("{}", issue);
                    load.issues.push(issue);
                }
            }
        }

        load
    }
}

/// Backslash-escapes every `$` that `dotenvy` would substitute.
///
/// Tracks the same quoting states the dotenv grammar uses: single-quoted text and
/// comments are copied as is, and an existing backslash escape is left alone.
fn escape_substitutions(content: &str) -> Cow<'_, str> {
    #[derive(Clone, Copy)]
    enum State {
        LineStart,
        Plain,
        Space,
        Escape,
        Strong,
        Weak,
        WeakEscape,
        Comment,
    }

    if !content.contains('$') {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len() + 16);
    let mut state = State::LineStart;
    for c in content.chars() {
        state = match (state, c) {
            (State::Comment, '\n') => State::LineStart,
            (State::Comment, _) => State::Comment,
            (State::Escape, _) => State::Plain,
            (State::WeakEscape, _) => State::Weak,
            (State::Strong, '\'') => State::Plain,
            (State::Strong, _) => State::Strong,
            (State::Weak, '"') => State::Plain,
            (State::Weak, '\\') => State::WeakEscape,
            (State::Weak, '$') => {
                out.push('\\');
                State::Weak
            }
            (State::Weak, _) => State::Weak,
            (State::LineStart, c) if c.is_whitespace() => State::LineStart,
            (State::LineStart | State::Space, '#') => State::Comment,
            (_, '\n') => State::LineStart,
            (_, c) if c.is_whitespace() => State::Space,
            (_, '\\') => State::Escape,
            (_, '\'') => State::Strong,
            (_, '"') => State::Weak,
            (_, '$') => {
                out.push('\\');
                State::Plain
            }
            _ => State::Plain,
        };
        out.push(c);
    }
    Cow::Owned(out)
}

/// Decodes `bytes` line by line. Lines that are not valid UTF-8 are blanked, so later
/// line numbers still match the file, and reported.
fn decode_lines(source_name: &str, bytes: &[u8]) -> (String, Vec<LoadIssue>) {
    let mut issues = Vec::new();
    let lines: Vec<&str> = bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(index, line)| {
            std::str::from_utf8(line).unwrap_or_else(|e| {
                let issue = LoadIssue::new(
                    source_name,
                    format!("skipped line with invalid UTF-8 (byte {})", e.valid_up_to()),
                )
                .at_line(index + 1);
                tracing::warn!("{}", issue);
                issues.push(issue);
                ""
            })
        })
        .collect();
    (lines.join("\n"), issues)
}

/// Configuration source adapter for one dotenv file.
///
/// The file is read on every [`load`](ConfigSource::load), so a reload picks up edits.
/// A missing file is not an error and contributes nothing.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::adapters::EnvFileAdapter;
/// use miaoda_config::ports::ConfigSource;
///
/// let adapter = EnvFileAdapter::new("/nonexistent/.env.local", 2);
/// assert_eq!(adapter.name(), ".env.local");
/// assert!(adapter.load().unwrap().entries.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EnvFileAdapter {
    path: PathBuf,
    name: String,
    priority: u8,
    parser: EnvFileParser,
}

impl EnvFileAdapter {
    /// Creates an adapter for `path`. The source is named after the file name.
    pub fn new<P: AsRef<Path>>(path: P, priority: u8) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<env-file>")
            .to_string();
        Self {
            path,
            name,
            priority,
            parser: EnvFileParser,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn source_error(&self, message: String, source: Option<std::io::Error>) -> ConfigError {
        ConfigError::SourceError {
            source_name: self.name.clone(),
            message,
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}

impl ConfigSource for EnvFileAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn load(&self) -> Result<SourceLoad> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} not found at {}, skipping", self.name, self.path.display());
                return Ok(SourceLoad::default());
            }
            Err(e) => {
                return Err(self.source_error(format!("Failed to read file metadata: {}", e), Some(e)));
            }
        };

        if metadata.len() > MAX_ENV_FILE_SIZE {
            return Err(self.source_error(
                format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_ENV_FILE_SIZE
                ),
                None,
            ));
        }

        let bytes = fs::read(&self.path)
            .map_err(|e| self.source_error(format!("Failed to read configuration file: {}", e), Some(e)))?;

        let (content, mut issues) = decode_lines(&self.name, &bytes);
        let mut load = self.parser.parse(&self.name, &content);
        issues.append(&mut load.issues);
        issues.sort_by_key(|issue| issue.line);
        load.issues = issues;
        tracing::debug!(
            "Loaded {} entries from {} ({} skipped)",
            load.entries.len(),
            self.name,
            load.issues.len()
        );
        Ok(load)
    }
}
