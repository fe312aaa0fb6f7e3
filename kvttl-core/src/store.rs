use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::error::StoreError;
use crate::sweeper::Sweeper;

/// Internal shared state for the store
pub(crate) struct StoreInner<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V> StoreInner<K, V> {
    /// Removes every entry expired as of now, under the write lock.
    /// Returns the number of entries removed.
    pub(crate) fn sweep(&self) -> usize {
        let mut entries = self.entries.write();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }
}

/// Thread-safe in-memory key-value store with optional per-entry TTL
///
/// All entries sit behind a single reader/writer lock. Every public operation
/// runs its existence check and its mutation inside one critical section, so
/// two racing `put`s for the same absent key can never both succeed.
///
/// Expired entries are invisible to every operation as soon as their deadline
/// passes, but they stay in the map until a sweep removes them (see
/// [`Store::sweep`] and [`Sweeper`]). `put` and `put_with_ttl` may reuse such
/// a stale slot.
///
/// Cloning a `Store` is cheap and yields a handle to the same map.
///
/// # Example
///
/// ```rust
/// use kvttl_core::{Store, StoreError};
/// use std::time::Duration;
///
/// let store: Store<String, String> = Store::new();
///
/// store.put("user:123", "John Doe").unwrap();
/// assert!(matches!(store.put("user:123", "Jane"), Err(StoreError::AlreadyExists(_))));
///
/// store.set_ttl("user:123", Duration::from_secs(300)).unwrap();
/// assert_eq!(store.get("user:123").unwrap(), "John Doe");
/// ```
pub struct Store<K, V> {
    inner: Arc<StoreInner<K, V>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates an empty store and spawns its background sweeper
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store requires
    /// a runtime to spawn its background sweeper.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kvttl_core::{Store, StoreConfig};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = StoreConfig::default()
    ///         .with_sweep_interval(Duration::from_secs(30));
    ///     let store: Store<String, String> = Store::with_config(config);
    /// }
    /// ```
    pub fn with_config(config: StoreConfig) -> Self {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "kvttl_core::Store::with_config requires a Tokio runtime. \
                 Call it from within a #[tokio::main] or #[tokio::test] context, \
                 or use Store::new() and drive Store::sweep() yourself."
            );
        }

        let store = Self::new();
        // The sweeper holds a weak handle and exits on its own once the
        // last store handle is gone.
        let _sweeper = Sweeper::spawn(&store, config.sweep_interval);
        store
    }
}

impl<K: Eq + Hash, V> Store<K, V> {
    /// Creates an empty store without a background sweeper
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<StoreInner<K, V>> {
        Arc::downgrade(&self.inner)
    }

    /// Inserts a value that never expires.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a live entry occupies `key`.
    pub fn put(
        &self,
        key: impl Into<K>,
        value: impl Into<V>,
    ) -> Result<(), StoreError<K>> {
        self.insert_if_absent(key.into(), Entry::new(value.into()))
    }

    /// Inserts a value that expires `ttl` from now.
    ///
    /// The caller is responsible for rejecting zero or negative TTLs; the
    /// store accepts any duration and clamps absurdly large ones to
    /// [`MAX_TTL`](crate::MAX_TTL).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a live entry occupies `key`.
    pub fn put_with_ttl(
        &self,
        key: impl Into<K>,
        value: impl Into<V>,
        ttl: Duration,
    ) -> Result<(), StoreError<K>> {
        self.insert_if_absent(key.into(), Entry::with_ttl(value.into(), ttl))
    }

    fn insert_if_absent(&self, key: K, entry: Entry<V>) -> Result<(), StoreError<K>> {
        let mut entries = self.inner.entries.write();
        if exists(&entries, &key, Instant::now()) {
            return Err(StoreError::AlreadyExists(key));
        }
        // An expired entry still sitting in this slot is logically free.
        entries.insert(key, entry);
        Ok(())
    }

    /// Returns a copy of the live value stored under `key`.
    ///
    /// Expiry is checked at call time, whether or not a sweep has run.
    pub fn get<Q>(&self, key: &Q) -> Result<V, StoreError<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        V: Clone,
    {
        let entries = self.inner.entries.read();
        live(&entries, key, Instant::now())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    /// Replaces the value of a live entry. The entry's expiry, if any, is
    /// kept exactly as it was.
    pub fn update<Q>(&self, key: &Q, value: impl Into<V>) -> Result<(), StoreError<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let mut entries = self.inner.entries.write();
        let entry = live_mut(&mut entries, key, Instant::now())
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        entry.set_value(value.into());
        Ok(())
    }

    /// Removes a live entry and returns its value.
    ///
    /// Deleting is not idempotent: a second delete of the same key fails with
    /// `StoreError::NotFound`. An expired entry is reported as missing and is
    /// left for the sweeper.
    pub fn delete<Q>(&self, key: &Q) -> Result<V, StoreError<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let mut entries = self.inner.entries.write();
        let removed = if exists(&entries, key, Instant::now()) {
            entries.remove(key)
        } else {
            None
        };
        removed
            .map(Entry::into_value)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    /// Sets the expiry of a live entry to `ttl` from now, replacing any
    /// previous expiry. The stored value is not touched.
    pub fn set_ttl<Q>(&self, key: &Q, ttl: Duration) -> Result<(), StoreError<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let mut entries = self.inner.entries.write();
        let now = Instant::now();
        let entry = live_mut(&mut entries, key, now)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        entry.set_ttl_at(now, ttl);
        Ok(())
    }

    /// Returns the time left before a live entry expires.
    ///
    /// `Ok(None)` means the entry has no TTL and never expires. The remaining
    /// time is computed on every call.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Result<Option<Duration>, StoreError<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let entries = self.inner.entries.read();
        let now = Instant::now();
        live(&entries, key, now)
            .map(|entry| entry.remaining_at(now))
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    /// Checks if a key maps to a live entry.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = self.inner.entries.read();
        exists(&entries, key, Instant::now())
    }

    /// Returns the number of entries in the store (including expired ones
    /// not yet swept)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Returns `true` if the store holds no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Runs one reclamation pass, removing every expired entry.
    ///
    /// Returns the number of entries removed. This is what the background
    /// [`Sweeper`] calls on each tick.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    /// Stores a value that has already expired (for testing purposes)
    #[cfg(test)]
    fn put_expired(&self, key: impl Into<K>, value: impl Into<V>) {
        let expires_at = Instant::now() - Duration::from_secs(1);
        self.inner
            .entries
            .write()
            .insert(key.into(), Entry::with_expiry(value.into(), expires_at));
    }
}

fn live<'a, K, V, Q>(entries: &'a HashMap<K, Entry<V>>, key: &Q, now: Instant) -> Option<&'a Entry<V>>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    entries.get(key).filter(|entry| !entry.is_expired_at(now))
}

fn live_mut<'a, K, V, Q>(
    entries: &'a mut HashMap<K, Entry<V>>,
    key: &Q,
    now: Instant,
) -> Option<&'a mut Entry<V>>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    entries.get_mut(key).filter(|entry| !entry.is_expired_at(now))
}

/// The existence predicate. Callers hold the lock for the whole operation.
fn exists<K, V, Q>(entries: &HashMap<K, Entry<V>>, key: &Q, now: Instant) -> bool
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    live(entries, key, now).is_some()
}
