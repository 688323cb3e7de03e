//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::filters::{DeduplicateFilter, ListenedFilter};
use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, ListeningContext};

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(DeduplicateFilter)
///     .add_filter(ListenedFilter);
///
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The mixer's pipeline: first-occurrence dedup, then history exclusion.
    pub fn standard() -> Self {
        Self::new()
            .add_filter(DeduplicateFilter)
            .add_filter(ListenedFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - The filtered candidates after all filters
    /// * `Err` - If any filter fails
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &ListeningContext,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::{Candidate, CandidateSource};

    fn track_ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.track_id.as_str()).collect()
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = ListeningContext::new("u1", vec![]);

        let candidates = vec![
            Candidate::new("t1", CandidateSource::Personal, 0.9),
            Candidate::new("t1", CandidateSource::Popular, 8.0),
        ];

        let filtered = pipeline.apply(candidates, &context).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_filter() {
        let context = ListeningContext::new("u1", vec!["t1".to_string()]);

        let pipeline = FilterPipeline::new().add_filter(ListenedFilter);

        let candidates = vec![
            Candidate::new("t1", CandidateSource::Personal, 0.9),
            Candidate::new("t2", CandidateSource::Popular, 8.0),
        ];

        let filtered = pipeline.apply(candidates, &context).unwrap();
        assert_eq!(track_ids(&filtered), vec!["t2"]);
    }

    #[test]
    fn test_standard_pipeline() {
        let context = ListeningContext::new("u1", vec!["t3".to_string()]);

        let candidates = vec![
            Candidate::new("t1", CandidateSource::Personal, 0.9),
            Candidate::new("t3", CandidateSource::Personal, 0.8),
            Candidate::new("t2", CandidateSource::SimilarOnline, 0.7),
            Candidate::new("t1", CandidateSource::SimilarOnline, 0.6),
            Candidate::new("t4", CandidateSource::Popular, 9.0),
        ];

        let filtered = FilterPipeline::standard().apply(candidates, &context).unwrap();
        assert_eq!(track_ids(&filtered), vec!["t1", "t2", "t4"]);
        assert_eq!(filtered[0].source, CandidateSource::Personal);
    }
}
