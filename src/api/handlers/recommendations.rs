use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::require;
use crate::{api::AppState, error::AppResult, models::Article, services::Recommender};

/// Upper bound on `num_recommendations`; larger requests are clamped
pub const MAX_RECOMMENDATIONS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub num_recommendations: Option<usize>,
}

/// Runs a recommender; only a missing user id is reported as an error
async fn run(
    recommender: &dyn Recommender,
    default_limit: usize,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Vec<Article>>> {
    let Json(request) = payload?;
    let user_id = require("user_id", request.user_id.as_deref())?;
    let limit = request
        .num_recommendations
        .unwrap_or(default_limit)
        .min(MAX_RECOMMENDATIONS);

    Ok(Json(recommender.recommend(user_id, limit).await))
}

/// Keyword-similarity recommendations, with a model fallback for new users
pub async fn content_based(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Vec<Article>>> {
    run(state.content.as_ref(), state.default_recommendations, payload).await
}

/// Embedding-model recommendations, with a popularity fallback for unknown users
pub async fn collaborative(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Vec<Article>>> {
    run(state.collaborative.as_ref(), state.default_recommendations, payload).await
}
