//! Core domain types for the recommendation lookup tables.
//!
//! Identifiers are opaque strings. Numeric ids coming out of the exported
//! tables are canonicalized by the parser before they reach these types, so
//! equality and hashing here are plain string comparisons.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a listener
pub type UserId = String;

/// Identifier of a music track
pub type TrackId = String;

// =============================================================================
// Table Rows
// =============================================================================

/// One row of the offline personal recommendation table (ALS output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecommendation {
    pub user_id: UserId,
    pub track_id: TrackId,
    pub score: f32,
}

/// Directed, weighted edge from a seed track to a similar track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTrack {
    pub track_id: TrackId,
    pub similar_track_id: TrackId,
    pub similarity_score: f32,
}

/// One entry of the global popularity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularTrack {
    pub track_id: TrackId,
    pub popularity_score: f32,
}

/// Row counts of a snapshot, used for logging and the reload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableCounts {
    pub personal_rows: usize,
    pub users: usize,
    pub similar_edges: usize,
    pub seed_tracks: usize,
    pub popular_tracks: usize,
}

/// Descending score order. Stable sorts with this comparator keep the file
/// order for equal scores.
pub fn score_desc(a: f32, b: f32) -> Ordering {
    b.total_cmp(&a)
}

// =============================================================================
// TableSnapshot - The Immutable Lookup Tables
// =============================================================================

/// All three lookup tables, indexed for per-request lookups.
///
/// A snapshot is built once and then only read. Reloading the tables means
/// building a new snapshot and swapping it in, never mutating a live one.
///
/// Row order inside each group is the order rows were inserted (file order),
/// which is what breaks score ties downstream. The popularity ranking is
/// always kept sorted by `popularity_score` descending.
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    /// Personal rows grouped by user
    pub(crate) personal: HashMap<UserId, Vec<PersonalRecommendation>>,
    /// Similarity edges grouped by seed track
    pub(crate) similar: HashMap<TrackId, Vec<SimilarTrack>>,
    /// Global ranking, most popular first
    pub(crate) popular: Vec<PopularTrack>,
}

impl TableSnapshot {
    /// Creates a snapshot with three empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from already parsed rows.
    pub fn from_rows(
        personal: Vec<PersonalRecommendation>,
        similar: Vec<SimilarTrack>,
        popular: Vec<PopularTrack>,
    ) -> Self {
        let mut snapshot = Self::new();
        for row in personal {
            snapshot.insert_personal(row);
        }
        for edge in similar {
            snapshot.insert_similar(edge);
        }
        snapshot.popular = popular;
        snapshot.rank_popularity();
        snapshot
    }

    /// All personal rows of a user, in file order.
    ///
    /// Returns an empty slice for unknown users.
    pub fn get_personal(&self, user_id: &str) -> &[PersonalRecommendation] {
        self.personal
            .get(user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All similarity edges leaving a seed track, in file order
    pub fn get_similar(&self, track_id: &str) -> &[SimilarTrack] {
        self.similar
            .get(track_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The popularity ranking, most popular first
    pub fn popular(&self) -> &[PopularTrack] {
        &self.popular
    }

    /// Users that have at least one personal row
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.personal.keys()
    }

    pub fn insert_personal(&mut self, row: PersonalRecommendation) {
        self.personal
            .entry(row.user_id.clone())
            .or_default()
            .push(row);
    }

    pub fn insert_similar(&mut self, edge: SimilarTrack) {
        self.similar
            .entry(edge.track_id.clone())
            .or_default()
            .push(edge);
    }

    /// Inserts into the popularity ranking after every track with an equal
    /// or higher score.
    pub fn insert_popular(&mut self, track: PopularTrack) {
        let pos = self.popular.partition_point(|p| {
            score_desc(p.popularity_score, track.popularity_score) != Ordering::Greater
        });
        self.popular.insert(pos, track);
    }

    /// Stable sort of the popularity ranking by score, descending
    pub(crate) fn rank_popularity(&mut self) {
        self.popular
            .sort_by(|a, b| score_desc(a.popularity_score, b.popularity_score));
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            personal_rows: self.personal.values().map(|v| v.len()).sum(),
            users: self.personal.len(),
            similar_edges: self.similar.values().map(|v| v.len()).sum(),
            seed_tracks: self.similar.len(),
            popular_tracks: self.popular.len(),
        }
    }

    /// True when all three tables have zero rows
    pub fn is_empty(&self) -> bool {
        self.personal.is_empty() && self.similar.is_empty() && self.popular.is_empty()
    }
}
