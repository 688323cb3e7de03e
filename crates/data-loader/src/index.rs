//! Building a TableSnapshot from the data directory.
//!
//! Two entry points:
//! - `load_from_files`: strict, any table failure is an error
//! - `load_or_empty`: a table that fails to load is replaced by an empty
//!   table of the same shape, so the service can still answer (with
//!   popularity-only or empty results) instead of refusing to start

use crate::error::Result;
use crate::parser::{self, PERSONAL_FILE, POPULAR_FILE, SIMILAR_FILE};
use crate::types::*;
use std::path::Path;
use tracing::{error, info};

impl TableSnapshot {
    /// Load all three tables from a directory, failing if any of them fails.
    ///
    /// The files are parsed in parallel with nested `rayon::join` calls.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!(data_dir = %data_dir.display(), "Loading recommendation tables");

        let (personal, similar, popular) = parse_all(data_dir);
        let snapshot = Self::from_rows(personal?, similar?, popular?);

        log_counts(&snapshot);
        Ok(snapshot)
    }

    /// Load all three tables, substituting an empty table for each one that
    /// cannot be loaded. Never fails.
    pub fn load_or_empty(data_dir: &Path) -> Self {
        info!(data_dir = %data_dir.display(), "Loading recommendation tables");

        let (personal, similar, popular) = parse_all(data_dir);
        let snapshot = Self::from_rows(
            personal.unwrap_or_else(|e| {
                error!(error = %e, "Personal recommendations unavailable, using empty table");
                Vec::new()
            }),
            similar.unwrap_or_else(|e| {
                error!(error = %e, "Similar tracks unavailable, using empty table");
                Vec::new()
            }),
            popular.unwrap_or_else(|e| {
                error!(error = %e, "Top popular unavailable, using empty table");
                Vec::new()
            }),
        );

        log_counts(&snapshot);
        snapshot
    }
}

type Parsed = (
    Result<Vec<PersonalRecommendation>>,
    Result<Vec<SimilarTrack>>,
    Result<Vec<PopularTrack>>,
);

fn parse_all(data_dir: &Path) -> Parsed {
    let personal_path = data_dir.join(PERSONAL_FILE);
    let similar_path = data_dir.join(SIMILAR_FILE);
    let popular_path = data_dir.join(POPULAR_FILE);

    let ((personal, similar), popular) = rayon::join(
        || {
            rayon::join(
                || parser::parse_personal(&personal_path),
                || parser::parse_similar(&similar_path),
            )
        },
        || parser::parse_popular(&popular_path),
    );

    (personal, similar, popular)
}

fn log_counts(snapshot: &TableSnapshot) {
    let counts = snapshot.counts();
    info!(
        personal_rows = counts.personal_rows,
        users = counts.users,
        similar_edges = counts.similar_edges,
        popular_tracks = counts.popular_tracks,
        "Recommendation tables loaded"
    );
}
