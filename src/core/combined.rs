//! Derived cell pairing the latest values of two [`Cell`]s.
//!
//! Emits `(left, right)` the first time both sides have a value and again on
//! every later replacement of either side, always carrying the latest value of
//! the other side. Replacements that happen while one side is still unset are
//! remembered but not emitted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::cell::Cell;

type PairSubscriber<A, B> = Arc<dyn Fn(&Arc<A>, &Arc<B>) + Send + Sync>;

struct Latest<A, B> {
    left: Option<Arc<A>>,
    right: Option<Arc<B>>,
}

struct CombinedInner<A, B> {
    latest: Mutex<Latest<A, B>>,
    subscribers: RwLock<Vec<PairSubscriber<A, B>>>,
    emissions: AtomicU64,
}

impl<A, B> CombinedInner<A, B> {
    fn on_left(&self, left: &Arc<A>) {
        let pair = {
            let mut latest = self.latest.lock();
            latest.left = Some(Arc::clone(left));
            latest.right.clone()
        };
        if let Some(right) = pair {
            self.emit(left, &right);
        }
    }

    fn on_right(&self, right: &Arc<B>) {
        let pair = {
            let mut latest = self.latest.lock();
            latest.right = Some(Arc::clone(right));
            latest.left.clone()
        };
        if let Some(left) = pair {
            self.emit(&left, right);
        }
    }

    fn emit(&self, left: &Arc<A>, right: &Arc<B>) {
        let generation = self.emissions.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(generation, "combined context emission");

        let subscribers = self.subscribers.read().clone();
        for subscriber in subscribers {
            subscriber(left, right);
        }
    }
}

/// Latest `(A, B)` pair of two cells, emitted once both are known.
pub struct CombinedCell<A, B> {
    inner: Arc<CombinedInner<A, B>>,
}

impl<A, B> CombinedCell<A, B>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
{
    /// Compose two cells. Values already present in either cell are picked up
    /// immediately; no emission happens until a subsequent replacement.
    pub fn new(left: &Cell<A>, right: &Cell<B>) -> Self {
        let inner = Arc::new(CombinedInner {
            latest: Mutex::new(Latest {
                left: left.current(),
                right: right.current(),
            }),
            subscribers: RwLock::new(Vec::new()),
            emissions: AtomicU64::new(0),
        });

        let on_left = Arc::clone(&inner);
        left.subscribe(move |value| on_left.on_left(value));

        let on_right = Arc::clone(&inner);
        right.subscribe(move |value| on_right.on_right(value));

        Self { inner }
    }

    /// Register a callback for every future pair emission.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Arc<A>, &Arc<B>) + Send + Sync + 'static,
    {
        self.inner.subscribers.write().push(Arc::new(callback));
    }

    /// The latest pair, if both sides have a value.
    pub fn current(&self) -> Option<(Arc<A>, Arc<B>)> {
        let latest = self.inner.latest.lock();
        match (&latest.left, &latest.right) {
            (Some(left), Some(right)) => Some((Arc::clone(left), Arc::clone(right))),
            _ => None,
        }
    }

    /// Total number of pairs emitted so far.
    pub fn emission_count(&self) -> u64 {
        self.inner.emissions.load(Ordering::SeqCst)
    }
}

impl<A, B> fmt::Debug for CombinedCell<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedCell")
            .field("emissions", &self.inner.emissions.load(Ordering::SeqCst))
            .finish()
    }
}
