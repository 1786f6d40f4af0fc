//! Deduplicating resource cache.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::{FetchError, Result};
use crate::fetcher::Fetcher;

/// Bounds every cache key satisfies.
pub trait CacheKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

type SuccessFn<V> = Box<dyn FnOnce(Arc<V>) + Send>;
type ErrorFn = Box<dyn FnOnce(FetchError) + Send>;

/// Someone interested in the outcome of a pending fetch.
enum Waiter<V> {
    Callbacks {
        on_success: SuccessFn<V>,
        on_error: ErrorFn,
    },
    Channel(oneshot::Sender<Result<Arc<V>>>),
}

impl<V> Waiter<V> {
    fn deliver(self, outcome: &Result<Arc<V>>) {
        match (self, outcome) {
            (Waiter::Callbacks { on_success, .. }, Ok(value)) => on_success(Arc::clone(value)),
            (Waiter::Callbacks { on_error, .. }, Err(err)) => on_error(err.clone()),
            (Waiter::Channel(tx), outcome) => {
                // Receiver gone means the awaiting caller was dropped.
                let _ = tx.send(outcome.clone());
            }
        }
    }
}

/// Entry stored in the cache.
///
/// Moves `Pending -> Ready | Failed` exactly once; only
/// [`ResourceCache::invalidate`] and [`ResourceCache::clear`] remove a
/// terminal entry.
enum CacheEntry<V> {
    Pending { fetch: u64, waiters: Vec<Waiter<V>> },
    Ready(Arc<V>),
    Failed(FetchError),
}

impl<V> CacheEntry<V> {
    fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending { .. })
    }
}

/// Snapshot of one key's load lifecycle, for synchronous render checks.
#[derive(Debug)]
pub enum LoadState<V> {
    /// Never requested (or invalidated).
    Idle,
    /// A fetch is in flight.
    Loading,
    Ready(Arc<V>),
    Failed(FetchError),
}

impl<V> LoadState<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn value(&self) -> Option<&Arc<V>> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<V> Clone for LoadState<V> {
    fn clone(&self) -> Self {
        match self {
            LoadState::Idle => LoadState::Idle,
            LoadState::Loading => LoadState::Loading,
            LoadState::Ready(value) => LoadState::Ready(Arc::clone(value)),
            LoadState::Failed(err) => LoadState::Failed(err.clone()),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, in any state.
    pub entries: usize,
    /// Fetches in flight, including ones detached by `clear`.
    pub pending: usize,
    /// Requests answered from a terminal entry.
    pub hits: u64,
    /// Requests that joined an in-flight fetch.
    pub coalesced: u64,
    /// Fetches started.
    pub fetches: u64,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    coalesced: u64,
    fetches: u64,
}

/// Inner state protected by the mutex.
struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Waiters of fetches detached by `clear`, keyed by fetch id. Their
    /// outcome is delivered but never stored.
    detached: HashMap<u64, Vec<Waiter<V>>>,
    counters: Counters,
}

/// What `register` decided while holding the lock.
enum Registration<V> {
    Deliver(Waiter<V>, Result<Arc<V>>),
    Queued,
    Fetch(u64),
}

/// Coalescing cache of remote resources.
///
/// Any number of callers may ask for the same key; while a fetch for it is in
/// flight they are queued, and exactly one request goes out. Outcomes, good or
/// bad, are kept for later callers. Waiters on one key are answered in the
/// order they asked; keys never wait on each other.
///
/// Clones share the same table. Callbacks always run with the table unlocked,
/// so a callback may call back into the cache.
pub struct ResourceCache<K: CacheKey, V: Send + Sync + 'static> {
    inner: Arc<Mutex<CacheInner<K, V>>>,
    fetcher: Arc<dyn Fetcher<K, V>>,
}

impl<K: CacheKey, V: Send + Sync + 'static> Clone for ResourceCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<K: CacheKey, V: Send + Sync + 'static> fmt::Debug for ResourceCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl<K: CacheKey, V: Send + Sync + 'static> ResourceCache<K, V> {
    /// Create an empty cache around a fetch primitive.
    pub fn new(fetcher: impl Fetcher<K, V>) -> Self {
        Self::with_shared_fetcher(Arc::new(fetcher))
    }

    /// Create an empty cache around an already shared fetcher.
    pub fn with_shared_fetcher(fetcher: Arc<dyn Fetcher<K, V>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                detached: HashMap::new(),
                counters: Counters::default(),
            })),
            fetcher,
        }
    }

    /// Request `key`, answering through exactly one of the callbacks.
    ///
    /// - cached value or cached error: the callback runs before `get` returns
    /// - fetch in flight: the callbacks are queued behind earlier ones
    /// - unknown key: a fetch is started and `get` returns immediately
    ///
    /// Must be called from within a Tokio runtime to start fetches; outside
    /// one, a new entry fails with [`FetchError::Runtime`].
    pub fn get<S, E>(&self, key: K, on_success: S, on_error: E)
    where
        S: FnOnce(Arc<V>) + Send + 'static,
        E: FnOnce(FetchError) + Send + 'static,
    {
        self.register(
            key,
            Waiter::Callbacks {
                on_success: Box::new(on_success),
                on_error: Box::new(on_error),
            },
        );
    }

    /// Request `key` and await the outcome.
    ///
    /// Shares entries, ordering and deduplication with [`get`](Self::get).
    pub async fn load(&self, key: K) -> Result<Arc<V>> {
        let (tx, rx) = oneshot::channel();
        self.register(key, Waiter::Channel(tx));
        rx.await
            .unwrap_or_else(|_| Err(FetchError::Aborted("fetch task dropped".to_string())))
    }

    /// Current lifecycle state of `key`. Never starts a fetch.
    pub fn state(&self, key: &K) -> LoadState<V> {
        match self.inner.lock().entries.get(key) {
            None => LoadState::Idle,
            Some(CacheEntry::Pending { .. }) => LoadState::Loading,
            Some(CacheEntry::Ready(value)) => LoadState::Ready(Arc::clone(value)),
            Some(CacheEntry::Failed(err)) => LoadState::Failed(err.clone()),
        }
    }

    /// Drop the outcome cached for `key` so the next request fetches again.
    ///
    /// Returns `false` when there was nothing to drop. An in-flight fetch is
    /// left alone: its waiters are still answered by it.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.lock();
        let pending = match inner.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_pending(),
        };
        if pending {
            trace!(key = ?key, "Invalidate skipped, fetch in flight");
            return false;
        }
        inner.entries.remove(key);
        debug!(key = ?key, "Cache entry invalidated");
        true
    }

    /// Drop every terminal entry and detach every in-flight fetch.
    ///
    /// A detached fetch still answers the waiters it already has, but its
    /// outcome is not stored; the next request for that key fetches again.
    /// Returns the number of terminal entries dropped.
    pub fn clear(&self) -> usize {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let mut removed = 0;
        for (_, entry) in inner.entries.drain() {
            match entry {
                CacheEntry::Pending { fetch, waiters } => {
                    inner.detached.insert(fetch, waiters);
                }
                CacheEntry::Ready(_) | CacheEntry::Failed(_) => removed += 1,
            }
        }
        debug!(
            count = removed,
            detached = inner.detached.len(),
            "Cache cleared"
        );
        removed
    }

    /// Number of entries in any state.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            pending: inner.entries.values().filter(|e| e.is_pending()).count()
                + inner.detached.len(),
            hits: inner.counters.hits,
            coalesced: inner.counters.coalesced,
            fetches: inner.counters.fetches,
        }
    }

    fn register(&self, key: K, waiter: Waiter<V>) {
        let registration = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            match inner.entries.get_mut(&key) {
                Some(CacheEntry::Ready(value)) => {
                    inner.counters.hits += 1;
                    Registration::Deliver(waiter, Ok(Arc::clone(value)))
                }
                Some(CacheEntry::Failed(err)) => {
                    inner.counters.hits += 1;
                    Registration::Deliver(waiter, Err(err.clone()))
                }
                Some(CacheEntry::Pending { waiters, .. }) => {
                    waiters.push(waiter);
                    inner.counters.coalesced += 1;
                    trace!(key = ?key, queued = waiters.len(), "Joined in-flight fetch");
                    Registration::Queued
                }
                None => {
                    inner.counters.fetches += 1;
                    let fetch = inner.counters.fetches;
                    inner.entries.insert(
                        key.clone(),
                        CacheEntry::Pending {
                            fetch,
                            waiters: vec![waiter],
                        },
                    );
                    Registration::Fetch(fetch)
                }
            }
        };

        match registration {
            Registration::Deliver(waiter, outcome) => {
                trace!(key = ?key, ok = outcome.is_ok(), "Answered from cache");
                waiter.deliver(&outcome);
            }
            Registration::Queued => {}
            Registration::Fetch(fetch) => self.spawn_fetch(key, fetch),
        }
    }

    fn spawn_fetch(&self, key: K, fetch: u64) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(key = ?key, "No runtime available, failing fetch");
                self.complete(&key, fetch, Err(FetchError::Runtime(e.to_string())));
                return;
            }
        };

        debug!(key = ?key, fetch, "Cache miss, fetching");
        // Built outside the task so it fires even if the task never runs.
        let guard = FetchGuard {
            cache: self.clone(),
            key,
            fetch,
            armed: true,
        };
        handle.spawn(async move {
            let mut guard = guard;
            let outcome = AssertUnwindSafe(guard.cache.fetcher.fetch(&guard.key))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(FetchError::Aborted("fetcher panicked".to_string())));
            guard.armed = false;
            guard.cache.complete(&guard.key, fetch, outcome);
        });
    }

    /// Settle fetch `fetch` for `key` and answer its waiters, oldest first.
    ///
    /// The outcome is stored only while the entry still belongs to this
    /// fetch; a fetch detached by `clear` just answers its own waiters.
    fn complete(&self, key: &K, fetch: u64, outcome: Result<V>) {
        let outcome = outcome.map(Arc::new);

        let waiters = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let owned = matches!(
                inner.entries.get(key),
                Some(CacheEntry::Pending { fetch: current, .. }) if *current == fetch
            );
            if owned {
                let terminal = match &outcome {
                    Ok(value) => CacheEntry::Ready(Arc::clone(value)),
                    Err(err) => CacheEntry::Failed(err.clone()),
                };
                match inner.entries.insert(key.clone(), terminal) {
                    Some(CacheEntry::Pending { waiters, .. }) => waiters,
                    _ => Vec::new(),
                }
            } else if let Some(waiters) = inner.detached.remove(&fetch) {
                debug!(key = ?key, fetch, "Detached fetch finished, outcome dropped");
                waiters
            } else {
                warn!(key = ?key, fetch, "Fetch completed for an unknown entry");
                Vec::new()
            }
        };

        match &outcome {
            Ok(_) => debug!(key = ?key, waiters = waiters.len(), "Fetch succeeded"),
            Err(err) => debug!(key = ?key, waiters = waiters.len(), error = %err, "Fetch failed"),
        }

        for waiter in waiters {
            waiter.deliver(&outcome);
        }
    }
}

/// Settles a fetch whose task is dropped before it finishes, for example
/// when the runtime shuts down.
struct FetchGuard<K: CacheKey, V: Send + Sync + 'static> {
    cache: ResourceCache<K, V>,
    key: K,
    fetch: u64,
    armed: bool,
}

impl<K: CacheKey, V: Send + Sync + 'static> Drop for FetchGuard<K, V> {
    fn drop(&mut self) {
        if self.armed {
            warn!(key = ?self.key, fetch = self.fetch, "Fetch task dropped before completing");
            self.cache.complete(
                &self.key,
                self.fetch,
                Err(FetchError::Aborted("fetch task cancelled".to_string())),
            );
        }
    }
}
