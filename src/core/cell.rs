//! Single-writer reactive value holder.
//!
//! A [`Cell`] stores the latest `Arc<T>` and notifies its subscribers
//! synchronously, in subscription order, every time the value is replaced.
//! Stored values are never mutated in place: readers holding an older `Arc`
//! keep a consistent snapshot while newer readers see the replacement.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

type Subscriber<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

/// Reactive holder of the latest value of `T`.
pub struct Cell<T> {
    value: RwLock<Option<Arc<T>>>,
    subscribers: RwLock<Vec<Subscriber<T>>>,
}

impl<T> Cell<T>
where
    T: Send + Sync + 'static,
{
    /// Create an unset cell.
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Create a cell that already holds `value`.
    pub fn with_value(value: T) -> Self {
        Self {
            value: RwLock::new(Some(Arc::new(value))),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Store `value` and notify every subscriber with it.
    ///
    /// Returns the stored `Arc` so the writer can keep using the snapshot it published.
    pub fn replace(&self, value: T) -> Arc<T> {
        self.replace_arc(Arc::new(value))
    }

    /// Store an already shared value and notify every subscriber with it.
    pub fn replace_arc(&self, value: Arc<T>) -> Arc<T> {
        *self.value.write() = Some(Arc::clone(&value));

        // Subscribers run outside the lock so they may read this cell or subscribe.
        let subscribers = self.subscribers.read().clone();
        for subscriber in subscribers {
            subscriber(&value);
        }
        value
    }

    /// The latest value, or `None` while unset.
    pub fn current(&self) -> Option<Arc<T>> {
        self.value.read().clone()
    }

    /// Whether a value has ever been stored.
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// Register a callback for future replacements. The current value is not replayed.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        self.subscribers.write().push(Arc::new(callback));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<T> Default for Cell<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("value", &*self.value.read())
            .field("subscribers", &self.subscribers.read().len())
            .finish()
    }
}
