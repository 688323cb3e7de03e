use std::path::PathBuf;
use std::sync::Arc;

use crate::store::SnapshotStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    /// Where `/admin/reload` reads the tables from
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(store: SnapshotStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            data_dir: data_dir.into(),
        }
    }

    /// Load the tables from `data_dir` and wrap them in a store
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let store = SnapshotStore::from_dir(&data_dir);
        Self::new(store, data_dir)
    }
}
