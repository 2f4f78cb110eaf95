use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::{Article, ArticleId},
    services::articles::{self, SearchQuery, SearchResponse},
};

pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<Json<Article>> {
    let article_id: ArticleId = article_id
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid article id: {}", article_id)))?;

    let article = articles::get_article(state.store.as_ref(), article_id).await?;
    Ok(Json(article))
}

/// Searches the catalog loaded at start-up
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(query) = query?;
    let response = articles::search_articles(&state.catalog, &query)?;

    tracing::debug!(
        query = %query.query,
        total_results = response.total_results,
        "Search completed"
    );

    Ok(Json(response))
}
