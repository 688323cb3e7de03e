//! Similar Tracks Source - Online History Expansion
//!
//! "You just played X, here is what sounds like X."
//!
//! ## Algorithm
//! For each seed track, in the order the caller gave them:
//! 1. Take the seed's similarity edges (file order)
//! 2. Stable sort by similarity score, descending
//! 3. Append the first `per_track` similar tracks
//!
//! Seeds without edges contribute nothing and do not stop the remaining
//! seeds. The output may contain the same track more than once when two
//! seeds share a neighbour; deduplication happens later in the pipeline.

use crate::types::{Candidate, CandidateSource};
use data_loader::{SimilarTrack, TableSnapshot, TrackId, score_desc};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SimilarTracksSource {
    snapshot: Arc<TableSnapshot>,
}

impl SimilarTracksSource {
    pub fn new(snapshot: Arc<TableSnapshot>) -> Self {
        Self { snapshot }
    }

    /// Up to `per_track` neighbours of every seed, concatenated in seed order
    #[instrument(skip(self, seeds), fields(seeds = seeds.len()))]
    pub fn get_candidates(&self, seeds: &[TrackId], per_track: usize) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for seed in seeds {
            let mut edges: Vec<&SimilarTrack> = self.snapshot.get_similar(seed).iter().collect();
            if edges.is_empty() {
                continue;
            }

            edges.sort_by(|a, b| score_desc(a.similarity_score, b.similarity_score));

            candidates.extend(edges.into_iter().take(per_track).map(|edge| {
                Candidate::new(
                    edge.similar_track_id.clone(),
                    CandidateSource::SimilarOnline,
                    edge.similarity_score,
                )
                .with_seed(seed.clone())
            }));
        }

        debug!("Generated {} similar-online candidates", candidates.len());
        candidates
    }
}
