use std::collections::HashMap;

use crate::{
    db::{collections, DocumentStore},
    error::AppResult,
    models::{Article, ArticleId, CatalogPosition},
};

/// In-memory, ordered article catalog
///
/// Keeps an injective `article_id → position` mapping so callers never have to
/// treat a catalog position as an article id or vice versa.
#[derive(Debug, Default)]
pub struct ArticleCatalog {
    articles: Vec<Article>,
    positions: HashMap<ArticleId, CatalogPosition>,
}

impl ArticleCatalog {
    /// Builds a catalog from an ordered list of articles
    ///
    /// Later duplicates of an already-seen `article_id` are dropped.
    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let mut catalog = Self::default();

        for article in articles {
            if catalog.positions.contains_key(&article.article_id) {
                tracing::warn!(article_id = %article.article_id, "Duplicate article id in catalog, skipping");
                continue;
            }
            let position = CatalogPosition(catalog.articles.len());
            catalog.positions.insert(article.article_id, position);
            catalog.articles.push(article);
        }

        catalog
    }

    /// Reads every article document from the store
    ///
    /// Documents that cannot be parsed are skipped and logged.
    pub async fn fetch(store: &dyn DocumentStore) -> AppResult<Self> {
        let docs = store.scan(collections::ARTICLES).await?;
        let total = docs.len();

        let articles: Vec<Article> = docs
            .iter()
            .filter_map(|doc| match doc.parse::<Article>() {
                Ok(article) => Some(article),
                Err(e) => {
                    tracing::warn!(document_id = %doc.id, error = %e, "Skipping malformed article");
                    None
                }
            })
            .collect();

        if articles.len() < total {
            tracing::warn!(
                loaded = articles.len(),
                skipped = total - articles.len(),
                "Some article documents could not be parsed"
            );
        }

        Ok(Self::from_articles(articles))
    }

    /// Loads the catalog at process start
    ///
    /// A failing store yields an empty catalog rather than an error: recommenders
    /// treat that as "no candidates".
    pub async fn load(store: &dyn DocumentStore) -> Self {
        match Self::fetch(store).await {
            Ok(catalog) => {
                tracing::info!(articles = catalog.len(), store = store.name(), "Article catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load article catalog, continuing with an empty one");
                Self::default()
            }
        }
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn position_of(&self, article_id: ArticleId) -> Option<CatalogPosition> {
        self.positions.get(&article_id).copied()
    }

    pub fn at(&self, position: CatalogPosition) -> Option<&Article> {
        self.articles.get(position.0)
    }

    pub fn get(&self, article_id: ArticleId) -> Option<&Article> {
        self.position_of(article_id).and_then(|position| self.at(position))
    }

    pub fn contains(&self, article_id: ArticleId) -> bool {
        self.positions.contains_key(&article_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockDocumentStore};
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_positions_are_independent_of_ids() {
        let catalog = ArticleCatalog::from_articles(vec![
            Article::new(900, "First", 1, &[]),
            Article::new(12, "Second", 2, &[]),
        ]);

        assert_eq!(catalog.position_of(ArticleId(900)), Some(CatalogPosition(0)));
        assert_eq!(catalog.position_of(ArticleId(12)), Some(CatalogPosition(1)));
        assert_eq!(catalog.position_of(ArticleId(0)), None);
        assert_eq!(catalog.at(CatalogPosition(1)).unwrap().title, "Second");
        assert_eq!(catalog.get(ArticleId(900)).unwrap().title, "First");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = ArticleCatalog::from_articles(vec![
            Article::new(1, "Original", 1, &[]),
            Article::new(1, "Duplicate", 1, &[]),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(ArticleId(1)).unwrap().title, "Original");
    }

    #[tokio::test]
    async fn test_load_skips_malformed_documents() {
        let store = MemoryStore::new();
        store
            .insert("articles", "1", json!({"article_id": 1, "title": "Ok"}))
            .await
            .unwrap();
        store
            .insert("articles", "2", json!({"title": "No id"}))
            .await
            .unwrap();

        let catalog = ArticleCatalog::load(&store).await;
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(ArticleId(1)));
    }

    #[tokio::test]
    async fn test_load_failure_yields_empty_catalog() {
        let mut store = MockDocumentStore::new();
        store
            .expect_scan()
            .returning(|_| Err(AppError::Internal("store offline".to_string())));
        store.expect_name().return_const("mock");

        let catalog = ArticleCatalog::load(&store).await;
        assert!(catalog.is_empty());
    }
}
