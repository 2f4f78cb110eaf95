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
    services::favorites,
};

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub user_id: String,
    pub article_id: ArticleId,
}

pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(request) = payload?;
    let user_id = require("user_id", Some(request.user_id.as_str()))?;

    favorites::add_favorite(state.store.as_ref(), user_id, request.article_id).await?;
    Ok((StatusCode::CREATED, message("Article added to favorites")))
}

pub async fn remove(
    State(state): State<AppState>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let user_id = require("user_id", Some(request.user_id.as_str()))?;

    favorites::remove_favorite(state.store.as_ref(), user_id, request.article_id).await?;
    Ok(message("Article removed from favorites"))
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Article>>> {
    let articles = favorites::favorite_articles(state.store.as_ref(), &user_id).await?;
    Ok(Json(articles))
}
