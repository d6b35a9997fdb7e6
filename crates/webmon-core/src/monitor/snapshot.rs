use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::state::CycleResult;

/// Holds the most recent completed probe cycle.
///
/// Cloning the store clones the handle, not the snapshot: every clone sees
/// the same current value. Readers always get an owned copy, so a publish
/// can never change what a reader already holds.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<CycleResult>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot.
    pub async fn publish(&self, cycle: CycleResult) {
        let cycle_id = cycle.id;
        let sites = cycle.len();
        *self.current.write().await = Some(cycle);
        debug!(%cycle_id, sites, "Published snapshot");
    }

    /// Copy of the current snapshot, or `None` before the first cycle completes.
    pub async fn read(&self) -> Option<CycleResult> {
        self.current.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.current.read().await.is_none()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::SiteConfig;
    use crate::monitor::state::SiteResult;

    fn cycle(code: u16, sites: usize) -> CycleResult {
        let results = (0..sites)
            .map(|i| {
                SiteResult::reached(
                    SiteConfig {
                        id: format!("site_{}", i),
                        url: format!("https://s{}.example.com/", i),
                        content: "x".into(),
                        full_match: false,
                    },
                    code,
                    0.01,
                    true,
                )
            })
            .collect();
        CycleResult::new(Utc::now(), results)
    }

    #[tokio::test]
    async fn empty_before_first_publish() {
        let store = SnapshotStore::new();
        assert!(store.is_empty().await);
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn publish_replaces_previous_snapshot() {
        let store = SnapshotStore::new();
        let first = cycle(200, 2);
        let second = cycle(503, 3);
        store.publish(first).await;
        store.publish(second.clone()).await;
        assert_eq!(store.read().await, Some(second));
    }

    #[tokio::test]
    async fn read_returns_an_independent_copy() {
        let store = SnapshotStore::new();
        store.publish(cycle(200, 1)).await;

        let mut copy = store.read().await.unwrap();
        copy.results.clear();

        assert_eq!(store.read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_the_same_snapshot() {
        let store = SnapshotStore::new();
        let reader = store.clone();
        let published = cycle(200, 2);
        store.publish(published.clone()).await;
        assert_eq!(reader.read().await, Some(published));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_never_observe_torn_snapshots() {
        const SITES: usize = 16;
        const PUBLISHES: u16 = 300;

        let store = SnapshotStore::new();
        let publisher = {
            let store = store.clone();
            tokio::spawn(async move {
                for generation in 1..=PUBLISHES {
                    store.publish(cycle(generation, SITES)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..6)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut last_seen = 0u16;
                    for _ in 0..500 {
                        if let Some(snapshot) = store.read().await {
                            assert_eq!(snapshot.len(), SITES);
                            let generation = snapshot.results[0].code.unwrap();
                            assert!(
                                snapshot.results.iter().all(|r| r.code == Some(generation)),
                                "snapshot mixes generations"
                            );
                            assert!(generation >= last_seen, "snapshot went backwards");
                            last_seen = generation;
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        publisher.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        let last = store.read().await.unwrap();
        assert_eq!(last.results[0].code, Some(PUBLISHES));
    }
}
