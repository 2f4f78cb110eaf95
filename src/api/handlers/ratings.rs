use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{message, require};
use crate::{
    api::AppState,
    error::AppResult,
    models::{Article, ArticleId},
    services::ratings::{self, RatingOutcome},
};

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub user_id: String,
    pub article_id: ArticleId,
    #[serde(deserialize_with = "crate::models::lenient_i64")]
    pub article_rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct RatingKey {
    pub user_id: String,
    pub article_id: ArticleId,
}

/// Creates or updates the caller's rating of an article
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(request) = payload?;
    let user_id = require("user_id", Some(request.user_id.as_str()))?;

    let outcome = ratings::submit_rating(
        state.store.as_ref(),
        user_id,
        request.article_id,
        request.article_rating,
    )
    .await?;

    Ok(match outcome {
        RatingOutcome::Created => (StatusCode::CREATED, message("Rating submitted successfully")),
        RatingOutcome::Updated => (StatusCode::OK, message("Rating updated successfully")),
    })
}

pub async fn remove(
    State(state): State<AppState>,
    payload: Result<Json<RatingKey>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let user_id = require("user_id", Some(request.user_id.as_str()))?;

    ratings::delete_rating(state.store.as_ref(), user_id, request.article_id).await?;
    Ok(message("Rating deleted successfully"))
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Article>>> {
    let articles = ratings::rated_articles(state.store.as_ref(), &user_id).await?;
    Ok(Json(articles))
}
