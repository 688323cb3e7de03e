use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::info;

use data_loader::{canonical_id, TableCounts, TrackId, UserId};

use crate::mixer::RecommendationMixer;
use crate::strategy::Strategy;

use super::{ApiError, ApiResult, AppState};

pub const DEFAULT_N_RECOMMENDATIONS: i64 = 10;

// Request/Response types

/// A track or user id as it may arrive in JSON: a string or a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    /// Same rule as the table loader, so `42`, `42.0` and `"42"` all match
    fn canonicalize(self) -> String {
        let raw = match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        canonical_id(&raw).unwrap_or_default()
    }
}

fn canonical_user_id<'de, D>(deserializer: D) -> Result<UserId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.canonicalize())
}

/// `null` and absence both mean no history
fn canonical_history<'de, D>(deserializer: D) -> Result<Vec<TrackId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(RawId::canonicalize)
        .collect())
}

fn default_n_recommendations() -> i64 {
    DEFAULT_N_RECOMMENDATIONS
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(deserialize_with = "canonical_user_id")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "canonical_history")]
    pub online_history: Vec<TrackId>,
    #[serde(default = "default_n_recommendations")]
    pub n_recommendations: i64,
}

impl RecommendationRequest {
    /// Non-positive sizes ask for nothing
    pub fn limit(&self) -> usize {
        usize::try_from(self.n_recommendations).unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub recommendations: Vec<TrackId>,
    pub strategy: Strategy,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub tables: TableCounts,
    pub timestamp: String,
}

fn now_rfc3339() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Handlers

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Music Recommendation Service" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_rfc3339(),
    }))
}

pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> ApiResult<Json<RecommendationResponse>> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let limit = request.limit();

    // Pin one snapshot for the whole request
    let snapshot = state.store.load();
    let user_id = request.user_id.clone();
    let history = request.online_history;

    let mixed = tokio::task::spawn_blocking(move || {
        RecommendationMixer::new(snapshot).mix(&user_id, &history, limit)
    })
    .await??;

    Ok(Json(RecommendationResponse {
        user_id: request.user_id,
        recommendations: mixed.tracks,
        strategy: mixed.strategy,
        timestamp: now_rfc3339(),
    }))
}

pub async fn reload(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let store = state.store.clone();
    let data_dir = state.data_dir.clone();
    info!(data_dir = %data_dir.display(), "Reloading tables");

    let tables = tokio::task::spawn_blocking(move || store.reload_from(&data_dir)).await?;

    Ok(Json(ReloadResponse {
        status: "reloaded",
        tables,
        timestamp: now_rfc3339(),
    }))
}
