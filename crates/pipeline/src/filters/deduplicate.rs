//! Filter to drop repeated tracks.
//!
//! The candidate list is a concatenation of sources in priority order, so the
//! first occurrence of a track is the one from the highest-priority source.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::TrackId;
use sources::{Candidate, ListeningContext};
use std::collections::HashSet;

/// Keeps the first occurrence of every track, in order.
pub struct DeduplicateFilter;

impl Filter for DeduplicateFilter {
    fn name(&self) -> &str {
        "DeduplicateFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &ListeningContext,
    ) -> Result<Vec<Candidate>> {
        let mut seen: HashSet<TrackId> = HashSet::with_capacity(candidates.len());
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.track_id.clone()))
            .collect();
        Ok(filtered)
    }
}
