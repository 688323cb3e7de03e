//! Personal Source - Offline Per-User Ranking
//!
//! Serves the precomputed user-specific list (ALS output).
//!
//! ## Algorithm
//! 1. Take the user's rows from the snapshot (file order)
//! 2. Stable sort by score, descending, so equal scores keep file order
//! 3. Return the first `limit` tracks
//!
//! A user without rows gets an empty list, not an error.

use crate::types::{Candidate, CandidateSource, ListeningContext};
use data_loader::{PersonalRecommendation, TableSnapshot, score_desc};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Personal source reads the user-specific table
#[derive(Clone)]
pub struct PersonalSource {
    /// Shared reference to the table snapshot (read-only, so no lock needed)
    snapshot: Arc<TableSnapshot>,
}

impl PersonalSource {
    pub fn new(snapshot: Arc<TableSnapshot>) -> Self {
        Self { snapshot }
    }

    /// Top `limit` personal candidates for the context's user
    #[instrument(skip(self, context), fields(user_id = %context.user_id))]
    pub fn get_candidates(&self, context: &ListeningContext, limit: usize) -> Vec<Candidate> {
        let mut rows: Vec<&PersonalRecommendation> =
            self.snapshot.get_personal(&context.user_id).iter().collect();

        // `sort_by` is stable
        rows.sort_by(|a, b| score_desc(a.score, b.score));

        let candidates: Vec<Candidate> = rows
            .into_iter()
            .take(limit)
            .map(|row| Candidate::new(row.track_id.clone(), CandidateSource::Personal, row.score))
            .collect();

        debug!("Generated {} personal candidates", candidates.len());
        candidates
    }
}
