//! Filter to remove tracks the caller has just listened to.
//!
//! Nobody wants to be recommended the song that is still playing.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, ListeningContext};

/// Removes candidates present in the caller's online history.
///
/// ## Algorithm
/// Uses the HashSet in ListeningContext.listened for O(1) lookups.
pub struct ListenedFilter;

impl Filter for ListenedFilter {
    fn name(&self) -> &str {
        "ListenedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &ListeningContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.listened.contains(&candidate.track_id))
            .collect();
        Ok(filtered)
    }
}
