//! Bounded LRU memo store with single-flight fills.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::task::JoinError;
use tracing::debug;

use crate::entry::{Flight, Outcome};
use crate::{CacheError, Entry, EntryState, Fingerprint};

/// Default number of entries a store holds.
pub const DEFAULT_CAPACITY: usize = 1000;

type Entries<V> = Mutex<LruCache<Fingerprint, Entry<V>>>;

/// A bounded map from [`Fingerprint`] to [`Entry`].
///
/// Both lookups and insertions count as a use for eviction. Entries never
/// expire by time. The lock is never held across an await point.
pub struct MemoStore<V> {
    entries: Arc<Entries<V>>,
}

impl<V: Clone> MemoStore<V> {
    /// Creates a store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity(capacity))?;
        Ok(Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        })
    }

    /// Looks up an entry and marks it as most recently used.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Entry<V>> {
        self.entries.lock().get(fingerprint).cloned()
    }

    /// Inserts or replaces an entry, evicting the least recently used one
    /// if the store is full.
    pub fn set(&self, fingerprint: Fingerprint, entry: Entry<V>) {
        let mut entries = self.entries.lock();
        insert(&mut entries, fingerprint, entry);
    }

    /// Reports the state of an entry without touching its recency.
    pub fn state(&self, fingerprint: &Fingerprint) -> EntryState {
        self.entries
            .lock()
            .peek(fingerprint)
            .map_or(EntryState::Absent, Entry::state)
    }

    /// Returns true if the entry exists, without touching its recency.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.lock().contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Drops every entry. In-flight computations still complete and store
    /// their results.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<V: Clone + Send + Sync + 'static> MemoStore<V> {
    /// Returns the cached value for `fingerprint`, computing it with `init`
    /// on a miss.
    ///
    /// At most one computation runs per fingerprint at a time. The first
    /// caller to miss records a pending entry before the lock is released,
    /// then spawns the future returned by `init` as its own task. Every
    /// caller, the first included, waits on that task, and dropping a
    /// caller does not cancel it.
    ///
    /// On success the entry becomes resolved. On failure it is removed and
    /// the first caller gets the error; nothing is cached for the failure,
    /// and callers that were waiting look the entry up again.
    ///
    /// Must be called within a tokio runtime.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        fingerprint: Fingerprint,
        init: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: From<JoinError> + Send + 'static,
    {
        let publisher = loop {
            let flight = {
                let mut entries = self.entries.lock();
                match entries.get(&fingerprint) {
                    Some(Entry::Resolved(value)) => {
                        debug!(%fingerprint, "cache hit");
                        return Ok(value.clone());
                    }
                    Some(Entry::Pending(flight)) => {
                        debug!(%fingerprint, "joining in-flight computation");
                        flight.clone()
                    }
                    None => {
                        debug!(%fingerprint, "cache miss");
                        let (entry, publisher) = Entry::pending();
                        insert(&mut entries, fingerprint, entry);
                        break publisher;
                    }
                }
            };

            if let Some(value) = flight.wait().await {
                return Ok(value);
            }
            abandon(&self.entries, fingerprint, &flight);
        };

        let flight = publisher.flight();
        let future = init();
        let entries = Arc::clone(&self.entries);
        let task = tokio::spawn(async move {
            let result = future.await;
            match &result {
                Ok(value) => {
                    resolve(&entries, fingerprint, &publisher.flight(), value.clone());
                    publisher.publish(Outcome::Done(value.clone()));
                }
                Err(_) => {
                    abandon(&entries, fingerprint, &publisher.flight());
                    publisher.publish(Outcome::Failed);
                }
            }
            result
        });

        match task.await {
            Ok(result) => result,
            Err(err) => {
                abandon(&self.entries, fingerprint, &flight);
                Err(E::from(err))
            }
        }
    }
}

/// Promotes the pending entry of `flight` to a resolved entry.
///
/// If the entry was evicted or removed while computing, the value is
/// stored again. An entry replaced by an unrelated `set` is left alone.
fn resolve<V>(entries: &Entries<V>, fingerprint: Fingerprint, flight: &Flight<V>, value: V) {
    let mut entries = entries.lock();
    match entries.peek_mut(&fingerprint) {
        Some(entry) if entry.is_pending_on(flight) => *entry = Entry::Resolved(value),
        Some(_) => {}
        None => insert(&mut entries, fingerprint, Entry::Resolved(value)),
    }
}

/// Removes the pending entry of `flight` after a failed computation.
fn abandon<V>(entries: &Entries<V>, fingerprint: Fingerprint, flight: &Flight<V>) {
    let mut entries = entries.lock();
    if entries
        .peek(&fingerprint)
        .is_some_and(|entry| entry.is_pending_on(flight))
    {
        entries.pop(&fingerprint);
        debug!(%fingerprint, "computation failed, entry cleared");
    }
}

fn insert<V>(entries: &mut LruCache<Fingerprint, Entry<V>>, fingerprint: Fingerprint, entry: Entry<V>) {
    if let Some((evicted, _)) = entries.push(fingerprint, entry)
        && evicted != fingerprint
    {
        debug!(fingerprint = %evicted, "evicted least recently used entry");
    }
}

impl<V> std::fmt::Debug for MemoStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("MemoStore")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    fn fp(n: u64) -> Fingerprint {
        Fingerprint::compute("content", "origin", n, "ast")
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            MemoStore::<u32>::new(0),
            Err(CacheError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_get_and_set() {
        let store = MemoStore::new(4).unwrap();
        assert!(store.get(&fp(1)).is_none());

        store.set(fp(1), Entry::Resolved(10));
        assert_eq!(store.get(&fp(1)).and_then(|e| e.value().copied()), Some(10));
        assert_eq!(store.state(&fp(1)), EntryState::Resolved);
        assert_eq!(store.state(&fp(2)), EntryState::Absent);
        assert_eq!(store.len(), 1);
        assert_eq!(store.capacity(), 4);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let store = MemoStore::new(3).unwrap();
        for n in 1..=3 {
            store.set(fp(n), Entry::Resolved(n));
        }
        store.set(fp(4), Entry::Resolved(4));

        assert!(!store.contains(&fp(1)));
        assert!(store.contains(&fp(2)));
        assert!(store.contains(&fp(4)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let store = MemoStore::new(3).unwrap();
        for n in 1..=3 {
            store.set(fp(n), Entry::Resolved(n));
        }
        store.get(&fp(1));
        store.set(fp(4), Entry::Resolved(4));

        assert!(store.contains(&fp(1)));
        assert!(!store.contains(&fp(2)));
    }

    #[test]
    fn test_state_does_not_touch() {
        let store = MemoStore::new(2).unwrap();
        store.set(fp(1), Entry::Resolved(1));
        store.set(fp(2), Entry::Resolved(2));
        assert_eq!(store.state(&fp(1)), EntryState::Resolved);
        store.set(fp(3), Entry::Resolved(3));

        assert_eq!(store.state(&fp(1)), EntryState::Absent);
    }

    #[test]
    fn test_clear() {
        let store = MemoStore::new(2).unwrap();
        store.set(fp(1), Entry::Resolved(1));
        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_caches_value() {
        let store = MemoStore::new(8).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = store
                .get_or_try_insert_with(fp(1), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, io::Error>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.state(&fp(1)), EntryState::Resolved);
    }

    #[tokio::test]
    async fn test_failure_clears_pending_entry() {
        let store = MemoStore::<u32>::new(8).unwrap();

        let err = store
            .get_or_try_insert_with(fp(1), || async { Err(io::Error::other("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(store.state(&fp(1)), EntryState::Absent);

        let value = store
            .get_or_try_insert_with(fp(1), || async { Ok::<_, io::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_entry_is_pending_while_computing() {
        let store = Arc::new(MemoStore::<u32>::new(8).unwrap());
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .get_or_try_insert_with(fp(1), || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, io::Error>(5)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        assert_eq!(store.state(&fp(1)), EntryState::Pending);
        release_tx.send(()).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), 5);
        assert_eq!(store.state(&fp(1)), EntryState::Resolved);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_computation() {
        let store = Arc::new(MemoStore::<u32>::new(8).unwrap());
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .get_or_try_insert_with(fp(1), || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, io::Error>(11)
                    })
                    .await
            })
        };
        started_rx.await.unwrap();
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert_eq!(store.state(&fp(1)), EntryState::Pending);

        release_tx.send(()).unwrap();
        let value = store
            .get_or_try_insert_with(fp(1), || async { Ok::<_, io::Error>(99) })
            .await
            .unwrap();
        assert_eq!(value, 11);
        assert_eq!(store.state(&fp(1)), EntryState::Resolved);
    }
}
