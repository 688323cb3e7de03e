//! Holder of the current table snapshot.
//!
//! Requests grab the current snapshot once and keep using it until they
//! finish. A reload builds a complete new snapshot off to the side and then
//! swaps the pointer, so a request sees either the old tables or the new
//! ones, never a mix.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use data_loader::{TableCounts, TableSnapshot};

pub struct SnapshotStore {
    current: ArcSwap<TableSnapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: TableSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Load the tables from `data_dir`, with empty tables for any that fail
    pub fn from_dir(data_dir: &Path) -> Self {
        Self::new(TableSnapshot::load_or_empty(data_dir))
    }

    /// The snapshot to use for one request
    pub fn load(&self) -> Arc<TableSnapshot> {
        self.current.load_full()
    }

    /// Atomically replace the current snapshot
    pub fn replace(&self, snapshot: TableSnapshot) {
        let counts = snapshot.counts();
        self.current.store(Arc::new(snapshot));
        info!(
            personal_rows = counts.personal_rows,
            similar_edges = counts.similar_edges,
            popular_tracks = counts.popular_tracks,
            "Swapped in new table snapshot"
        );
    }

    /// Rebuild from `data_dir` and swap. Blocking; call off the async runtime.
    pub fn reload_from(&self, data_dir: &Path) -> TableCounts {
        let snapshot = TableSnapshot::load_or_empty(data_dir);
        let counts = snapshot.counts();
        self.replace(snapshot);
        counts
    }
}
