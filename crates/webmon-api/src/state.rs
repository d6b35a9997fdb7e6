use std::sync::Arc;

use webmon_core::{Monitor, SnapshotStore};

/// Shared handler state: the snapshot handle for reads, plus the monitor
/// when one is attached (for scheduler state and configured sites).
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotStore,
    pub monitor: Option<Arc<Monitor>>,
}

impl AppState {
    pub fn new(snapshots: SnapshotStore) -> Self {
        Self {
            snapshots,
            monitor: None,
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SnapshotStore::new())
    }
}
