//! # Recommendation Mixer
//!
//! Blends the three sources into one list:
//! 1. Personal candidates (top `n` by score)
//! 2. Similar-online candidates (2 per history track), only with history
//! 3. Popular fallback (pool of `2n`), only while the list is shorter than `n`,
//!    skipping tracks already in the list
//! 4. Deduplicate, keeping first occurrences
//! 5. Drop tracks from the online history
//! 6. Truncate to `n`
//!
//! The strategy label is computed from the inputs (history given, personal
//! rows found), not from what ends up in the final list.
//!
//! A mixer is a cheap bundle of `Arc`s over one `TableSnapshot`. It holds no
//! mutable state, so the same snapshot can serve any number of concurrent
//! requests.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use data_loader::{TableSnapshot, TrackId};
use pipeline::FilterPipeline;
use sources::{Candidate, ListeningContext, PersonalSource, PopularSource, SimilarTracksSource};

use crate::strategy::Strategy;

/// Neighbours taken per online history track, independent of the request size
pub const SIMILAR_PER_TRACK: usize = 2;

/// The popularity pool is this many times the requested size, so there is
/// fallback material left after deduplication and history exclusion
pub const POPULAR_POOL_FACTOR: usize = 2;

/// Final output of a mix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedRecommendations {
    pub tracks: Vec<TrackId>,
    pub strategy: Strategy,
}

/// Fuses personal, similar-online and popular candidates
#[derive(Clone)]
pub struct RecommendationMixer {
    personal: PersonalSource,
    similar: SimilarTracksSource,
    popular: PopularSource,
    filter_pipeline: Arc<FilterPipeline>,
}

impl RecommendationMixer {
    /// Create a mixer reading from `snapshot`
    pub fn new(snapshot: Arc<TableSnapshot>) -> Self {
        Self {
            personal: PersonalSource::new(snapshot.clone()),
            similar: SimilarTracksSource::new(snapshot.clone()),
            popular: PopularSource::new(snapshot),
            filter_pipeline: Arc::new(FilterPipeline::standard()),
        }
    }

    /// The user's `n` best personal tracks; empty for unknown users
    pub fn get_personal_recommendations(&self, user_id: &str, n: usize) -> Vec<TrackId> {
        let context = ListeningContext::new(user_id, Vec::new());
        track_ids(self.personal.get_candidates(&context, n))
    }

    /// Up to `n_per_track` neighbours of each track, in the given order
    pub fn get_similar_tracks(&self, track_ids_in: &[TrackId], n_per_track: usize) -> Vec<TrackId> {
        track_ids(self.similar.get_candidates(track_ids_in, n_per_track))
    }

    /// The `n` most popular tracks
    pub fn get_top_popular(&self, n: usize) -> Vec<TrackId> {
        track_ids(self.popular.get_candidates(n))
    }

    /// Main entry point: mix recommendations for one request
    ///
    /// # Arguments
    /// * `user_id` - Whose personal table rows to use
    /// * `online_history` - Recently played tracks, in caller order
    /// * `n_recommendations` - Maximum length of the result
    ///
    /// # Returns
    /// At most `n_recommendations` distinct tracks, none of them from
    /// `online_history`, plus the strategy label. Missing data never fails;
    /// an error here means a filter hit something it could not handle.
    pub fn mix(
        &self,
        user_id: &str,
        online_history: &[TrackId],
        n_recommendations: usize,
    ) -> Result<MixedRecommendations> {
        let start_time = Instant::now();
        let context = ListeningContext::new(user_id, online_history.to_vec());

        let personal = self.personal.get_candidates(&context, n_recommendations);
        let similar_online = self
            .similar
            .get_candidates(&context.online_history, SIMILAR_PER_TRACK);
        let top_popular = self
            .popular
            .get_candidates(n_recommendations.saturating_mul(POPULAR_POOL_FACTOR));
        debug!(
            personal = personal.len(),
            similar_online = similar_online.len(),
            top_popular = top_popular.len(),
            "Generated candidates"
        );

        let strategy = Strategy::from_inputs(context.has_history(), !personal.is_empty());

        let candidates =
            self.merge_candidates(personal, similar_online, top_popular, &context, n_recommendations);

        let mut filtered = self
            .filter_pipeline
            .apply(candidates, &context)
            .context("Failed to apply filters")?;
        filtered.truncate(n_recommendations);

        let tracks = track_ids(filtered);
        info!(
            user_id = %context.user_id,
            history = context.online_history.len(),
            recommendations = tracks.len(),
            strategy = %strategy,
            elapsed = ?start_time.elapsed(),
            "Mixed recommendations"
        );

        Ok(MixedRecommendations { tracks, strategy })
    }

    /// Concatenate the sources in priority order.
    ///
    /// Popular tracks are only appended when the higher tiers came up short,
    /// and only those not already in the list built so far. Duplicates
    /// inside the higher tiers are left for the dedup filter.
    fn merge_candidates(
        &self,
        personal: Vec<Candidate>,
        similar_online: Vec<Candidate>,
        top_popular: Vec<Candidate>,
        context: &ListeningContext,
        n_recommendations: usize,
    ) -> Vec<Candidate> {
        let mut candidates = personal;

        if context.has_history() {
            candidates.extend(similar_online);
        }

        if candidates.len() < n_recommendations {
            let additional: Vec<Candidate> = top_popular
                .into_iter()
                .filter(|popular| {
                    !candidates
                        .iter()
                        .any(|existing| existing.track_id == popular.track_id)
                })
                .collect();
            candidates.extend(additional);
        }

        candidates
    }
}

fn track_ids(candidates: Vec<Candidate>) -> Vec<TrackId> {
    candidates.into_iter().map(|c| c.track_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{PersonalRecommendation, PopularTrack, SimilarTrack};
    use std::collections::HashSet;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn personal(snapshot: &mut TableSnapshot, user_id: &str, rows: &[(&str, f32)]) {
        for &(track_id, score) in rows {
            snapshot.insert_personal(PersonalRecommendation {
                user_id: user_id.to_string(),
                track_id: track_id.to_string(),
                score,
            });
        }
    }

    fn similar(snapshot: &mut TableSnapshot, seed: &str, edges: &[(&str, f32)]) {
        for &(similar_track_id, similarity_score) in edges {
            snapshot.insert_similar(SimilarTrack {
                track_id: seed.to_string(),
                similar_track_id: similar_track_id.to_string(),
                similarity_score,
            });
        }
    }

    /// Popularity ranking p1 > p2 > ... > p{count}
    fn popular(snapshot: &mut TableSnapshot, count: usize) {
        for i in 1..=count {
            snapshot.insert_popular(PopularTrack {
                track_id: format!("p{}", i),
                popularity_score: (1000 - i) as f32,
            });
        }
    }

    fn mixer(snapshot: TableSnapshot) -> RecommendationMixer {
        RecommendationMixer::new(Arc::new(snapshot))
    }

    fn history(ids: &[&str]) -> Vec<TrackId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // ============================================================================
    // Named lookups
    // ============================================================================

    #[test]
    fn test_named_lookups() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t2", 0.5), ("t1", 0.9)]);
        similar(&mut snapshot, "t5", &[("t7", 0.3), ("t6", 0.8), ("t8", 0.1)]);
        popular(&mut snapshot, 3);
        let mixer = mixer(snapshot);

        assert_eq!(mixer.get_personal_recommendations("u1", 10), vec!["t1", "t2"]);
        assert!(mixer.get_personal_recommendations("u2", 10).is_empty());
        assert_eq!(mixer.get_similar_tracks(&history(&["t5"]), 2), vec!["t6", "t7"]);
        assert_eq!(mixer.get_top_popular(2), vec!["p1", "p2"]);
    }

    // ============================================================================
    // Scenarios
    // ============================================================================

    #[test]
    fn test_personal_only_then_popular_fallback() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t1", 0.9), ("t2", 0.5)]);
        popular(&mut snapshot, 10);

        let result = mixer(snapshot).mix("u1", &[], 5).unwrap();

        assert_eq!(result.tracks, vec!["t1", "t2", "p1", "p2", "p3"]);
        assert_eq!(result.strategy, Strategy::PersonalOnly);
    }

    #[test]
    fn test_online_history_with_popular_fallback() {
        let mut snapshot = TableSnapshot::new();
        similar(&mut snapshot, "t5", &[("t6", 0.8), ("t7", 0.3)]);
        popular(&mut snapshot, 10);
        // The just-played track is also popular
        snapshot.insert_popular(PopularTrack {
            track_id: "t5".to_string(),
            popularity_score: 5000.0,
        });

        let result = mixer(snapshot).mix("u1", &history(&["t5"]), 5).unwrap();

        assert_eq!(result.tracks, vec!["t6", "t7", "p1", "p2", "p3"]);
        assert_eq!(result.strategy, Strategy::OnlineHistoryAndTopPopular);
    }

    #[test]
    fn test_personal_track_also_popular_keeps_personal_position() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("p3", 0.9), ("t1", 0.5)]);
        popular(&mut snapshot, 10);

        let result = mixer(snapshot).mix("u1", &[], 5).unwrap();

        assert_eq!(result.tracks, vec!["p3", "t1", "p1", "p2", "p4"]);
        assert_eq!(result.tracks.iter().filter(|t| *t == "p3").count(), 1);
    }

    #[test]
    fn test_history_and_personal() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t1", 0.9), ("t6", 0.4)]);
        similar(&mut snapshot, "t5", &[("t6", 0.8), ("t7", 0.7), ("t8", 0.6)]);
        popular(&mut snapshot, 10);

        let result = mixer(snapshot).mix("u1", &history(&["t5"]), 5).unwrap();

        // t6 stays in its personal slot; similar adds only t7 (t8 is past the fan-out)
        assert_eq!(result.tracks, vec!["t1", "t6", "t7", "p1", "p2"]);
        assert_eq!(result.strategy, Strategy::OnlineHistoryAndPersonal);
    }

    #[test]
    fn test_label_ignores_filtered_content() {
        let mut snapshot = TableSnapshot::new();
        // Every similar track is also a personal track, so similar adds nothing
        personal(&mut snapshot, "u1", &[("t6", 0.9), ("t7", 0.8)]);
        similar(&mut snapshot, "t5", &[("t6", 0.8), ("t7", 0.3)]);

        let result = mixer(snapshot).mix("u1", &history(&["t5"]), 2).unwrap();

        assert_eq!(result.tracks, vec!["t6", "t7"]);
        assert_eq!(result.strategy, Strategy::OnlineHistoryAndPersonal);
    }

    #[test]
    fn test_personal_rows_that_were_just_played_still_count_for_label() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t5", 0.9)]);

        let result = mixer(snapshot).mix("u1", &history(&["t5"]), 3).unwrap();

        assert!(result.tracks.is_empty());
        assert_eq!(result.strategy, Strategy::OnlineHistoryAndPersonal);
    }

    #[test]
    fn test_popular_skipped_when_higher_tiers_fill_request() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t1", 0.9), ("t2", 0.8)]);
        similar(&mut snapshot, "t1", &[("t1", 0.9)]);
        popular(&mut snapshot, 5);

        // personal (2) + similar (1) == n, so no popular fallback; then t1 is
        // deduplicated and excluded, leaving the list short
        let result = mixer(snapshot).mix("u1", &history(&["t1"]), 3).unwrap();

        assert_eq!(result.tracks, vec!["t2"]);
    }

    #[test]
    fn test_popular_pool_is_twice_request_size() {
        let mut snapshot = TableSnapshot::new();
        popular(&mut snapshot, 10);

        // p1..p4 is the whole pool for n = 2; all four were just played
        let result = mixer(snapshot)
            .mix("u1", &history(&["p1", "p2", "p3", "p4"]), 2)
            .unwrap();

        assert!(result.tracks.is_empty());
        assert_eq!(result.strategy, Strategy::OnlineHistoryAndTopPopular);
    }

    // ============================================================================
    // Properties
    // ============================================================================

    #[test]
    fn test_empty_everywhere() {
        let result = mixer(TableSnapshot::new()).mix("u1", &[], 10).unwrap();

        assert!(result.tracks.is_empty());
        assert_eq!(result.strategy, Strategy::TopPopularOnly);
    }

    #[test]
    fn test_zero_recommendations() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t1", 0.9)]);
        popular(&mut snapshot, 5);

        let result = mixer(snapshot).mix("u1", &[], 0).unwrap();

        assert!(result.tracks.is_empty());
        // No personal candidates were requested, so none were found
        assert_eq!(result.strategy, Strategy::TopPopularOnly);
    }

    #[test]
    fn test_fallback_completeness_in_popularity_order() {
        let mut snapshot = TableSnapshot::new();
        popular(&mut snapshot, 20);

        let result = mixer(snapshot).mix("nobody", &history(&["p2"]), 5).unwrap();

        assert_eq!(result.tracks, vec!["p1", "p3", "p4", "p5", "p6"]);
    }

    #[test]
    fn test_bounded_distinct_and_no_history_leakage() {
        let mut snapshot = TableSnapshot::new();
        personal(
            &mut snapshot,
            "u1",
            &[("t1", 0.9), ("t2", 0.8), ("p1", 0.7), ("t3", 0.6), ("t2", 0.5)],
        );
        similar(&mut snapshot, "t3", &[("t1", 0.9), ("p2", 0.8)]);
        similar(&mut snapshot, "p1", &[("t4", 0.9), ("t3", 0.8)]);
        popular(&mut snapshot, 30);
        let mixer = mixer(snapshot);

        let histories = [
            history(&[]),
            history(&["t3"]),
            history(&["p1", "t3"]),
            history(&["t3", "p1", "p2", "t2"]),
        ];
        for online_history in &histories {
            for n in [0, 1, 2, 3, 5, 8, 13] {
                let result = mixer.mix("u1", online_history, n).unwrap();

                assert!(result.tracks.len() <= n);
                let distinct: HashSet<&TrackId> = result.tracks.iter().collect();
                assert_eq!(distinct.len(), result.tracks.len());
                assert!(result.tracks.iter().all(|t| !online_history.contains(t)));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let mut snapshot = TableSnapshot::new();
        personal(&mut snapshot, "u1", &[("t1", 0.5), ("t2", 0.5), ("t3", 0.5)]);
        similar(&mut snapshot, "t9", &[("t4", 0.2), ("t5", 0.2), ("t6", 0.2)]);
        popular(&mut snapshot, 10);
        let mixer = mixer(snapshot);

        let first = mixer.mix("u1", &history(&["t9"]), 6).unwrap();
        for _ in 0..10 {
            assert_eq!(mixer.mix("u1", &history(&["t9"]), 6).unwrap(), first);
        }
        assert_eq!(first.tracks, vec!["t1", "t2", "t3", "t4", "t5", "p1"]);
    }

    #[test]
    fn test_huge_request_does_not_overflow() {
        let mut snapshot = TableSnapshot::new();
        popular(&mut snapshot, 3);

        let result = mixer(snapshot).mix("u1", &[], usize::MAX).unwrap();
        assert_eq!(result.tracks, vec!["p1", "p2", "p3"]);
    }
}
