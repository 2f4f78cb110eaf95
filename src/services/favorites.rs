use serde_json::json;

use super::{articles, users};
use crate::{
    db::{collections, fields, DocumentStore},
    error::{AppError, AppResult},
    models::{Article, ArticleId},
};

async fn store_favorites(
    store: &dyn DocumentStore,
    user_id: &str,
    favorites: &[ArticleId],
) -> AppResult<()> {
    store
        .update(
            collections::USERS,
            user_id,
            fields(json!({ "favorite_articles": favorites })),
        )
        .await
}

/// Adds an article to the user's favorites
pub async fn add_favorite(
    store: &dyn DocumentStore,
    user_id: &str,
    article_id: ArticleId,
) -> AppResult<()> {
    articles::ensure_article_exists(store, article_id).await?;
    let mut user = users::fetch_user(store, user_id).await?;

    if user.favorite_articles.contains(&article_id) {
        return Err(AppError::Conflict(
            "Article is already in the favorite list".to_string(),
        ));
    }

    user.favorite_articles.push(article_id);
    store_favorites(store, user_id, &user.favorite_articles).await?;

    tracing::info!(user_id = %user_id, article_id = %article_id, "Favorite added");
    Ok(())
}

/// Removes an article from the user's favorites
pub async fn remove_favorite(
    store: &dyn DocumentStore,
    user_id: &str,
    article_id: ArticleId,
) -> AppResult<()> {
    let mut user = users::fetch_user(store, user_id).await?;

    if !user.favorite_articles.contains(&article_id) {
        return Err(AppError::NotFound(
            "Article not found in the favorite list".to_string(),
        ));
    }

    user.favorite_articles.retain(|id| *id != article_id);
    store_favorites(store, user_id, &user.favorite_articles).await?;

    tracing::info!(user_id = %user_id, article_id = %article_id, "Favorite removed");
    Ok(())
}

pub async fn favorite_articles(store: &dyn DocumentStore, user_id: &str) -> AppResult<Vec<Article>> {
    let user = users::fetch_user(store, user_id).await?;
    articles::fetch_articles(store, &user.favorite_articles).await
}
