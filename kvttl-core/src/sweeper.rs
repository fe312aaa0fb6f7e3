//! Background reclamation of expired entries.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{Store, StoreInner};

/// Shortest interval accepted; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running background sweeper.
///
/// The sweeper wakes on a fixed interval, takes the store's write lock and
/// removes every expired entry. Reads never depend on it having run; it only
/// bounds how long dead entries occupy memory.
///
/// There is no cancel operation. The task keeps only a weak reference to the
/// store and stops by itself on the first tick after every [`Store`] handle
/// has been dropped. Dropping the `Sweeper` handle detaches the task.
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns a sweeper for `store` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn spawn<K, V>(store: &Store<K, V>, interval: Duration) -> Self
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        tracing::debug!(interval_ms = interval.as_millis() as u64, "starting sweeper");
        let handle = tokio::spawn(Self::run(store.downgrade(), interval));
        Self { handle }
    }

    /// Returns `true` once the sweeper task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    async fn run<K, V>(inner: Weak<StoreInner<K, V>>, interval: Duration)
    where
        K: Eq + Hash,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick - we want to wait for the interval first
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(store) = inner.upgrade() else {
                tracing::debug!("store dropped, stopping sweeper");
                break;
            };

            let removed = store.sweep();
            if removed > 0 {
                tracing::debug!(removed, "swept expired entries");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreConfig;

    #[tokio::test]
    async fn test_background_sweep_runs() {
        let store: Store<String, String> = Store::new();
        let _sweeper = Sweeper::spawn(&store, Duration::from_millis(50));

        store
            .put_with_ttl("short", "value", Duration::from_millis(10))
            .unwrap();
        store.put("long", "value").unwrap();
        assert_eq!(store.len(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.len(), 1);
        assert!(store.contains_key("long"));
    }

    #[tokio::test]
    async fn test_with_config_spawns_sweeper() {
        let config = StoreConfig::default().with_sweep_interval(Duration::from_millis(30));
        let store: Store<String, String> = Store::with_config(config);

        store
            .put_with_ttl("short", "value", Duration::from_millis(5))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sweeper_leaves_live_entries() {
        let store: Store<String, String> = Store::new();
        let _sweeper = Sweeper::spawn(&store, Duration::from_millis(20));

        store
            .put_with_ttl("ttl", "value", Duration::from_secs(60))
            .unwrap();
        store.put("forever", "value").unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("ttl").unwrap(), "value");
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_store_dropped() {
        let store: Store<String, String> = Store::new();
        let sweeper = Sweeper::spawn(&store, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sweeper.is_finished());

        drop(store);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(sweeper.is_finished());
    }

    #[tokio::test]
    async fn test_clone_keeps_sweeper_alive() {
        let store: Store<String, String> = Store::new();
        let sweeper = Sweeper::spawn(&store, Duration::from_millis(20));
        let clone = store.clone();

        drop(store);
        clone
            .put_with_ttl("short", "value", Duration::from_millis(5))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!sweeper.is_finished());
        assert!(clone.is_empty());
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let store: Store<String, String> = Store::new();
        let _sweeper = Sweeper::spawn(&store, Duration::ZERO);

        store
            .put_with_ttl("short", "value", Duration::from_millis(5))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.is_empty());
    }
}
