use serde_json::json;

use super::{articles, users};
use crate::{
    db::{collections, fields, to_document, DocumentStore, StoredDocument},
    error::{AppError, AppResult},
    models::{Article, ArticleId, Rating},
};

/// Whether a rating submission created a record or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    Created,
    Updated,
}

/// Document id of the rating for one (user, article) pair
pub fn rating_document_id(user_id: &str, article_id: ArticleId) -> String {
    format!("{}_{}", user_id, article_id)
}

/// Rating documents for one (user, article) pair
///
/// Besides the pair-keyed document, older data may hold copies under other ids.
async fn find_ratings(
    store: &dyn DocumentStore,
    user_id: &str,
    article_id: ArticleId,
) -> AppResult<Vec<StoredDocument>> {
    let docs = store
        .find_eq(collections::RATINGS, "user_id", &json!(user_id))
        .await?;

    Ok(docs
        .into_iter()
        .filter(|doc| {
            doc.parse::<Rating>()
                .map(|r| r.article_id == article_id)
                .unwrap_or(false)
        })
        .collect())
}

/// Records a user's rating of an article, keeping one rating per pair
///
/// The rating is written under its pair id, so repeated or concurrent
/// submissions overwrite one document. Copies under other ids are removed.
pub async fn submit_rating(
    store: &dyn DocumentStore,
    user_id: &str,
    article_id: ArticleId,
    value: i64,
) -> AppResult<RatingOutcome> {
    articles::ensure_article_exists(store, article_id).await?;
    let mut user = users::fetch_user(store, user_id).await?;

    let rating_id = rating_document_id(user_id, article_id);
    let existing = find_ratings(store, user_id, article_id).await?;

    let rating = Rating::new(user_id, article_id.0, value);
    store
        .set(collections::RATINGS, &rating_id, to_document(&rating)?)
        .await?;

    for legacy in existing.iter().filter(|doc| doc.id != rating_id) {
        store.delete(collections::RATINGS, &legacy.id).await?;
    }

    if !user.rated_articles.contains(&article_id) {
        user.rated_articles.push(article_id);
        store
            .update(
                collections::USERS,
                user_id,
                fields(json!({ "rated_articles": user.rated_articles })),
            )
            .await?;
    }

    if existing.is_empty() {
        tracing::info!(user_id = %user_id, article_id = %article_id, value, "Rating created");
        Ok(RatingOutcome::Created)
    } else {
        tracing::info!(user_id = %user_id, article_id = %article_id, value, "Rating updated");
        Ok(RatingOutcome::Updated)
    }
}

/// Removes a user's rating of an article
pub async fn delete_rating(
    store: &dyn DocumentStore,
    user_id: &str,
    article_id: ArticleId,
) -> AppResult<()> {
    let mut user = users::fetch_user(store, user_id).await?;

    let docs = find_ratings(store, user_id, article_id).await?;
    if docs.is_empty() {
        return Err(AppError::NotFound("Rating not found".to_string()));
    }

    for doc in &docs {
        store.delete(collections::RATINGS, &doc.id).await?;
    }

    let before = user.rated_articles.len();
    user.rated_articles.retain(|id| *id != article_id);
    if user.rated_articles.len() != before {
        store
            .update(
                collections::USERS,
                user_id,
                fields(json!({ "rated_articles": user.rated_articles })),
            )
            .await?;
    }

    tracing::info!(user_id = %user_id, article_id = %article_id, "Rating deleted");

    Ok(())
}

/// Articles the user has rated, in rating order
pub async fn rated_articles(store: &dyn DocumentStore, user_id: &str) -> AppResult<Vec<Article>> {
    let user = users::fetch_user(store, user_id).await?;
    articles::fetch_articles(store, &user.rated_articles).await
}
