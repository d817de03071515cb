// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification.
//!
//! Listeners run synchronously, in subscription order, on the thread that publishes.
//! A panicking listener is logged and skipped; it never stops later listeners or
//! reaches the publisher.

use crate::ports::{ChangeEvent, ChangeListener};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, ChangeListener)>>,
}

impl Registry {
    fn read(&self) -> RwLockReadGuard<'_, Vec<(u64, ChangeListener)>> {
        self.listeners.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(u64, ChangeListener)>> {
        self.listeners.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.write();
        let before = listeners.len();
        listeners.retain(|(entry, _)| *entry != id);
        listeners.len() != before
    }
}

/// An ordered list of change listeners.
///
/// Cloning a notifier yields a handle to the same listener list.
///
/// # Examples
///
/// ```rust
/// use miaoda_config::service::ChangeNotifier;
/// use miaoda_config::ports::ChangeEvent;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let notifier = ChangeNotifier::new();
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let subscription = notifier.subscribe(Arc::new(move |_: &ChangeEvent| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// notifier.publish(&ChangeEvent::new("base.port", 1420.into(), 8080.into()));
/// subscription.unsubscribe();
/// notifier.publish(&ChangeEvent::new("base.port", 8080.into(), 9090.into()));
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Registry>,
}

impl ChangeNotifier {
    /// Creates a notifier with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` and returns the handle that removes it.
    pub fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.write().push((id, listener));
        tracing::debug!("Registered change listener {}", id);
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every listener registered when the call starts.
    ///
    /// Returns the number of listeners that panicked.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let snapshot: Vec<(u64, ChangeListener)> = self.registry.read().clone();
        let mut failed = 0;

        for (id, listener) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            if let Err(payload) = outcome {
                failed += 1;
                tracing::error!(
                    "Change listener {} panicked while handling '{}': {}",
                    id,
                    event.key,
                    panic_message(payload.as_ref())
                );
            }
        }

        failed
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

/// Handle for one registered listener.
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
#[must_use = "dropping a Subscription leaves the listener registered with no way to remove it"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Returns the listener id, as shown in logs.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes exactly this listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let removed = registry.remove(self.id);
                if removed {
                    tracing::debug!("Removed change listener {}", self.id);
                }
                removed
            }
            None => false,
        }
    }
}
