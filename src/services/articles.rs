use serde::{Deserialize, Serialize};

use super::catalog::ArticleCatalog;
use crate::{
    db::{collections, DocumentStore},
    error::{AppError, AppResult},
    models::{Article, ArticleId},
};

const MAX_PER_PAGE: usize = 100;

/// Fetches one article document from the store
pub async fn get_article(store: &dyn DocumentStore, article_id: ArticleId) -> AppResult<Article> {
    let doc = store
        .get(collections::ARTICLES, &article_id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound("Article does not exist!".to_string()))?;

    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}

/// Fails with `NotFound` unless the article document exists
pub async fn ensure_article_exists(store: &dyn DocumentStore, article_id: ArticleId) -> AppResult<()> {
    match store.get(collections::ARTICLES, &article_id.to_string()).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("Article not found".to_string())),
    }
}

/// Resolves article ids to documents, skipping ids whose article has vanished
pub async fn fetch_articles(store: &dyn DocumentStore, ids: &[ArticleId]) -> AppResult<Vec<Article>> {
    let mut articles = Vec::with_capacity(ids.len());
    for &id in ids {
        match get_article(store, id).await {
            Ok(article) => articles.push(article),
            Err(AppError::NotFound(_)) => {
                tracing::debug!(article_id = %id, "Referenced article no longer exists");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(articles)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Title,
    Year,
    CitedBy,
}

/// Catalog search parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Comma-separated keyword categories; an article must match at least one
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort_by: SortBy::default(),
            categories: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    20
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub total_results: usize,
    pub page: usize,
    pub per_page: usize,
    pub articles: Vec<Article>,
}

/// Case-insensitive title search over the catalog with category filtering,
/// sorting and 1-based pagination
pub fn search_articles(catalog: &ArticleCatalog, query: &SearchQuery) -> AppResult<SearchResponse> {
    if query.page == 0 {
        return Err(AppError::InvalidInput("page starts at 1".to_string()));
    }
    if query.per_page == 0 || query.per_page > MAX_PER_PAGE {
        return Err(AppError::InvalidInput(format!(
            "per_page must be between 1 and {}",
            MAX_PER_PAGE
        )));
    }

    let needle = query.query.to_lowercase();
    let categories: Vec<String> = query
        .categories
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    let mut matches: Vec<&Article> = catalog
        .all()
        .iter()
        .filter(|a| a.title.to_lowercase().contains(&needle))
        .filter(|a| {
            if categories.is_empty() {
                return true;
            }
            let keywords = a.keyword_text().to_lowercase();
            categories.iter().any(|c| keywords.contains(c.as_str()))
        })
        .collect();

    match query.sort_by {
        SortBy::Year => matches.sort_by(|a, b| b.year.cmp(&a.year)),
        SortBy::CitedBy => matches.sort_by(|a, b| b.cited_by.cmp(&a.cited_by)),
        SortBy::Title => matches.sort_by_key(|a| a.title.to_lowercase()),
    }

    // Pages past the end are empty, however far past
    let offset = (query.page - 1).saturating_mul(query.per_page);
    let total_results = matches.len();
    let articles = matches
        .into_iter()
        .skip(offset)
        .take(query.per_page)
        .cloned()
        .collect();

    Ok(SearchResponse {
        total_results,
        page: query.page,
        per_page: query.per_page,
        articles,
    })
}
