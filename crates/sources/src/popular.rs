//! Popular Source - Global Fallback
//!
//! Reads the head of the global popularity ranking. The snapshot keeps the
//! ranking sorted by popularity score, so this is a plain prefix.

use crate::types::{Candidate, CandidateSource};
use data_loader::TableSnapshot;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct PopularSource {
    snapshot: Arc<TableSnapshot>,
}

impl PopularSource {
    pub fn new(snapshot: Arc<TableSnapshot>) -> Self {
        Self { snapshot }
    }

    /// The `limit` most popular tracks
    #[instrument(skip(self))]
    pub fn get_candidates(&self, limit: usize) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = self
            .snapshot
            .popular()
            .iter()
            .take(limit)
            .map(|p| Candidate::new(p.track_id.clone(), CandidateSource::Popular, p.popularity_score))
            .collect();

        debug!("Generated {} popular candidates", candidates.len());
        candidates
    }
}
