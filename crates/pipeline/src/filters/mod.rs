//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod deduplicate;
pub mod listened;

// Re-export for convenience
pub use deduplicate::DeduplicateFilter;
pub use listened::ListenedFilter;
