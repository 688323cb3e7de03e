//! Server crate for the track mixer.
//!
//! Holds the recommendation mixer, the hot-swappable table snapshot store
//! and the axum HTTP API that exposes them.

pub mod api;
pub mod mixer;
pub mod store;
pub mod strategy;

pub use api::{create_router, serve, ApiError, AppState};
pub use mixer::{MixedRecommendations, RecommendationMixer};
pub use store::SnapshotStore;
pub use strategy::Strategy;
