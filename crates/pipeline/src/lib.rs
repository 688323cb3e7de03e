//! Pipeline for filtering mixed track candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! The mixer concatenates the sources in priority order and then runs the
//! candidate list through the pipeline:
//! 1. `DeduplicateFilter` keeps the first occurrence of every track
//! 2. `ListenedFilter` drops tracks from the caller's online history
//!
//! Every filter keeps the order of the candidates it lets through, so the
//! output is still in priority order and can simply be truncated.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//!
//! let filtered = FilterPipeline::standard().apply(candidates, &context)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
