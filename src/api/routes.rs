//! Voting API routes
//!
//! `POST /api/vote` is the vote submission channel. The remaining routes are
//! read-only views over the item store plus a stateless prediction endpoint.

use crate::api::error::ApiError;
use crate::leaderboard::{self, ItemDetails, LeaderboardEntry};
use crate::rating::{expected_score, MatchOutcome, Prediction, Tier};
use crate::service::AppState;
use crate::types::{Category, ItemId, RatedItem, VoteReceipt, VoteSubmission};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query for `GET /api/{category}/pair`; both ids name the pair just shown
#[derive(Debug, Default, Deserialize)]
pub struct PairQuery {
    pub previous_first: Option<ItemId>,
    pub previous_second: Option<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
    pub category: Category,
    pub first: RatedItem,
    pub second: RatedItem,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub rating_a: f64,
    pub rating_b: f64,
    pub outcome: MatchOutcome,
}

/// Stateless prediction; participant A has id 0 and B id 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub expected_a: f64,
    pub prediction: Prediction,
    pub tier_a: Tier,
    pub tier_b: Tier,
}

pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/vote", post(submit_vote))
        .route("/api/predict", get(predict))
        .route("/api/{category}/pair", get(next_pair))
        .route("/api/{category}/leaderboard", get(leaderboard_handler))
        .route("/api/{category}/items/{id}", get(item_details_handler))
        .with_state(app_state)
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse::<Category>()
        .map_err(|e| ApiError::invalid_request(e.to_string()))
}

async fn submit_vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VoteSubmission>, JsonRejection>,
) -> Result<Json<VoteReceipt>, ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::invalid_request(e.body_text()))?;

    let receipt = state
        .vote_service()
        .submit(submission)
        .await
        .map_err(ApiError::vote)?;

    Ok(Json(receipt))
}

async fn next_pair(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<PairQuery>,
) -> Result<Json<PairResponse>, ApiError> {
    let category = parse_category(&category)?;
    let previous = query.previous_first.zip(query.previous_second);

    let (first, second) = state.vote_service().next_pair(category, previous).await?;

    Ok(Json(PairResponse {
        category,
        first,
        second,
    }))
}

async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let category = parse_category(&category)?;
    let store = state.item_store();

    let rows = leaderboard::leaderboard(store.as_ref(), category, query.search.as_deref()).await?;
    Ok(Json(rows))
}

async fn item_details_handler(
    State(state): State<Arc<AppState>>,
    Path((category, item_id)): Path<(String, ItemId)>,
) -> Result<Json<ItemDetails>, ApiError> {
    let category = parse_category(&category)?;
    let store = state.item_store();

    let details = leaderboard::item_details(store.as_ref(), category, item_id).await?;
    Ok(Json(details))
}

async fn predict(Query(query): Query<PredictQuery>) -> Result<Json<PredictResponse>, ApiError> {
    if !query.rating_a.is_finite() || !query.rating_b.is_finite() {
        return Err(ApiError::invalid_request("ratings must be finite numbers"));
    }

    let prediction = Prediction::new((0, query.rating_a), (1, query.rating_b), query.outcome);

    Ok(Json(PredictResponse {
        expected_a: expected_score(query.rating_a, query.rating_b),
        tier_a: Tier::from_rating(prediction.first.new_rating),
        tier_b: Tier::from_rating(prediction.second.new_rating),
        prediction,
    }))
}
