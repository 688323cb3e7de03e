//! Shared types for candidate generation.

use data_loader::{TrackId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which lookup table a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Offline, user-specific ranking
    Personal,
    /// Neighbours of a track in the caller's online history
    SimilarOnline,
    /// Global popularity fallback
    Popular,
}

/// A track proposed by one of the sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub track_id: TrackId,
    pub source: CandidateSource,
    /// Score from the table the candidate came from. Scores from different
    /// sources are not comparable.
    pub base_score: f32,
    /// History track that produced this candidate (similar-online only)
    pub seed: Option<TrackId>,
}

impl Candidate {
    pub fn new(track_id: impl Into<TrackId>, source: CandidateSource, base_score: f32) -> Self {
        Self {
            track_id: track_id.into(),
            source,
            base_score,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<TrackId>) -> Self {
        self.seed = Some(seed.into());
        self
    }
}

/// Everything known about the caller for one request
#[derive(Debug, Clone, Default)]
pub struct ListeningContext {
    pub user_id: UserId,
    /// Online history in caller order; this order drives similar lookups
    pub online_history: Vec<TrackId>,
    /// Same tracks as `online_history`, for O(1) exclusion checks
    pub listened: HashSet<TrackId>,
}

impl ListeningContext {
    pub fn new(user_id: impl Into<UserId>, online_history: Vec<TrackId>) -> Self {
        let listened = online_history.iter().cloned().collect();
        Self {
            user_id: user_id.into(),
            online_history,
            listened,
        }
    }

    pub fn has_history(&self) -> bool {
        !self.online_history.is_empty()
    }
}
