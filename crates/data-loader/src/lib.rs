//! # Data Loader Crate
//!
//! Loads and indexes the three lookup tables behind the track mixer:
//! personal recommendations, track similarity and global popularity.
//!
//! ## Main Components
//!
//! - **types**: Row types, id aliases and the immutable `TableSnapshot`
//! - **parser**: CSV parsing and identifier canonicalization
//! - **index**: Building a snapshot from a data directory
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::TableSnapshot;
//! use std::path::Path;
//!
//! // Missing or broken tables come back empty instead of failing
//! let snapshot = TableSnapshot::load_or_empty(Path::new("data"));
//!
//! let rows = snapshot.get_personal("1053");
//! let edges = snapshot.get_similar("589498");
//! let top = &snapshot.popular()[..10];
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::canonical_id;
pub use types::{
    // Type aliases
    UserId,
    TrackId,
    // Core types
    PersonalRecommendation,
    SimilarTrack,
    PopularTrack,
    TableCounts,
    TableSnapshot,
    score_desc,
};
