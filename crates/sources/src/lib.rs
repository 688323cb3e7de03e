//! # Sources Crate
//!
//! Candidate generation for the track mixer. Each source reads one lookup
//! table from a shared `TableSnapshot`.
//!
//! ## Components
//!
//! ### Personal Source
//! The user's offline ranking, best score first.
//!
//! ### Similar Tracks Source
//! Neighbours of the tracks in the caller's online history, a fixed number
//! per history track, in history order.
//!
//! ### Popular Source
//! The head of the global popularity ranking, used as a fallback tier.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{ListeningContext, PersonalSource, PopularSource, SimilarTracksSource};
//! use data_loader::TableSnapshot;
//! use std::sync::Arc;
//!
//! let snapshot = Arc::new(TableSnapshot::load_or_empty(Path::new("data")));
//! let context = ListeningContext::new("1053", vec!["589498".to_string()]);
//!
//! let personal = PersonalSource::new(snapshot.clone()).get_candidates(&context, 10);
//! let similar = SimilarTracksSource::new(snapshot.clone())
//!     .get_candidates(&context.online_history, 2);
//! let popular = PopularSource::new(snapshot).get_candidates(20);
//! ```
//!
//! Sources never fail: missing data is an empty candidate list.

// Public modules
pub mod types;
pub mod personal;
pub mod similar;
pub mod popular;

// Re-export commonly used types
pub use types::{Candidate, CandidateSource, ListeningContext};
pub use personal::PersonalSource;
pub use similar::SimilarTracksSource;
pub use popular::PopularSource;
