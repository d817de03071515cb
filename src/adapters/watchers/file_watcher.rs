// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for env source files.
//!
//! This module provides a watcher that monitors the source directory and signals when
//! one of the known env files is created, modified or removed.

use crate::domain::{ConfigError, Environment, Result};
use crate::ports::{ConfigWatcher, ReloadCallback};
use crate::service::loader::{LOCAL_FILE, TEMPLATE_FILE};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default debounce delay between two callbacks for the same file.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Returns `true` for the file names the loader reads.
pub fn is_source_file(name: &str) -> bool {
    name == TEMPLATE_FILE
        || name == LOCAL_FILE
        || Environment::ALL.iter().any(|env| env.file_name() == name)
}

/// File system watcher for the env source directory.
///
/// The directory is watched non-recursively. Events for unrelated files are ignored, and
/// repeated events for the same file inside the debounce window fire the callback once.
///
/// # Examples
///
/// ```rust,no_run
/// use miaoda_config::adapters::EnvFileWatcher;
/// use miaoda_config::ports::ConfigWatcher;
/// use std::sync::Arc;
///
/// # fn main() -> miaoda_config::domain::Result<()> {
/// let mut watcher = EnvFileWatcher::new("/path/to/project", None)?;
///
/// watcher.watch(Arc::new(|file: &str| {
///     println!("{} changed, reload due", file);
/// }))?;
///
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EnvFileWatcher {
    dir: PathBuf,
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_tx: Option<Sender<()>>,
}

impl EnvFileWatcher {
    /// Creates a watcher for the source directory `dir`.
    ///
    /// `debounce_delay` defaults to [`DEFAULT_DEBOUNCE`].
    pub fn new(dir: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.is_dir() {
            return Err(ConfigError::WatcherError {
                message: format!("Not a directory: {}", dir.display()),
                source: None,
            });
        }

        Ok(Self {
            dir,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        })
    }

    /// Returns the watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the debounce delay.
    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    /// Returns `true` while the watch thread is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

fn changed_source_files(event: &Event) -> impl Iterator<Item = String> + '_ {
    event
        .paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .filter(|name| is_source_file(name))
        .map(str::to_string)
}

impl ConfigWatcher for EnvFileWatcher {
    fn watch(&mut self, callback: ReloadCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(ConfigError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel::<notify::Result<Event>>();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                ConfigError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        let debounce_delay = self.debounce_delay;
        let watch_thread = thread::spawn(move || {
            let mut last_fired: HashMap<String, Instant> = HashMap::new();

            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }

                match event_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(Ok(event)) => {
                        for name in changed_source_files(&event) {
                            let now = Instant::now();
                            let due = last_fired
                                .get(&name)
                                .map_or(true, |last| now.duration_since(*last) >= debounce_delay);
                            if due {
                                last_fired.insert(name.clone(), now);
                                tracing::debug!("{} changed, signalling reload", name);
                                callback(&name);
                            }
                        }
                    }
                    Ok(Err(e)) => tracing::warn!("File watcher error: {}", e),
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        tracing::info!("Watching {} for env file changes", self.dir.display());
        self.watcher = Some(watcher);
        self.stop_tx = Some(stop_tx);
        self.watch_thread = Some(watch_thread);

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| ConfigError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }

        self.watcher = None;

        Ok(())
    }
}

impl Drop for EnvFileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
