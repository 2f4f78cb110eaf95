use std::collections::HashSet;
use std::sync::Arc;

use super::{
    catalog::ArticleCatalog,
    encoding::Encoder,
    inference::{ContentModel, InferenceError, RatingMatrix},
    recommendations::{
        fetch_ratings, sort_by_citations, top_k_indices, RecommendError, RecommendResult,
        Recommender,
    },
    similarity::KeywordSimilarityIndex,
};
use crate::{
    db::DocumentStore,
    models::{Article, ArticleId, CatalogPosition, Rating},
};

/// Content-based recommendations
///
/// Users with ratings get the articles whose keywords are closest to their
/// top-rated article. Users without ratings (cold start) get the content
/// model's highest predicted preferences.
pub struct ContentRecommender {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<ArticleCatalog>,
    index: Arc<KeywordSimilarityIndex>,
    model: Option<Arc<dyn ContentModel>>,
}

impl ContentRecommender {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<ArticleCatalog>,
        index: Arc<KeywordSimilarityIndex>,
        model: Option<Arc<dyn ContentModel>>,
    ) -> Self {
        Self {
            store,
            catalog,
            index,
            model,
        }
    }

    /// Articles similar to the user's highest-rated one, minus anything already rated
    fn similar_to_top_rated(&self, user_ratings: &[&Rating], limit: usize) -> RecommendResult {
        // First maximum wins; ratings arrive in store order
        let mut top = user_ratings[0];
        for &rating in &user_ratings[1..] {
            if rating.value > top.value {
                top = rating;
            }
        }

        let position = self
            .catalog
            .position_of(top.article_id)
            .ok_or(RecommendError::ArticleNotInCatalog(top.article_id))?;

        let rated: HashSet<ArticleId> = user_ratings.iter().map(|r| r.article_id).collect();

        let mut articles: Vec<Article> = self
            .index
            .top_k_excluding_self(position, limit)
            .into_iter()
            .filter_map(|p| self.catalog.at(p))
            .filter(|article| !rated.contains(&article.article_id))
            .cloned()
            .collect();

        tracing::debug!(
            top_rated = %top.article_id,
            candidates = articles.len(),
            "Ranked by keyword similarity"
        );

        sort_by_citations(&mut articles);
        articles.truncate(limit);
        Ok(articles)
    }

    /// Cold start: rank by the content model's prediction for an all-zero rating row
    fn predicted_for_new_user(&self, ratings: &[Rating], limit: usize) -> RecommendResult {
        let model = self
            .model
            .as_ref()
            .ok_or(RecommendError::ModelUnavailable("content"))?;

        let matrix = build_rating_matrix(ratings, &self.catalog);
        let predictions = model.predict(&matrix)?;
        if predictions.rows() != matrix.rows() || predictions.cols() != matrix.cols() {
            return Err(InferenceError::ShapeMismatch {
                expected: matrix.cols(),
                actual: predictions.cols(),
            }
            .into());
        }

        let preferences = predictions.row(matrix.rows() - 1);
        let mut articles: Vec<Article> = top_k_indices(preferences, limit)
            .into_iter()
            .filter_map(|i| self.catalog.at(CatalogPosition(i)))
            .cloned()
            .collect();

        sort_by_citations(&mut articles);
        Ok(articles)
    }
}

/// Dense rater × catalog matrix plus one trailing all-zero row for the requester
///
/// Rows follow the first appearance of each rater; columns are catalog
/// positions. Ratings for articles missing from the catalog contribute nothing.
pub fn build_rating_matrix(ratings: &[Rating], catalog: &ArticleCatalog) -> RatingMatrix {
    let mut raters: Encoder<&str> = Encoder::default();
    for rating in ratings {
        raters.insert(rating.user_id.as_str());
    }

    let mut matrix = RatingMatrix::zeros(raters.len() + 1, catalog.len());
    for rating in ratings {
        let (Some(row), Some(position)) = (
            raters.encode(&rating.user_id.as_str()),
            catalog.position_of(rating.article_id),
        ) else {
            continue;
        };
        matrix.set(row, position.0, rating.value as f32);
    }
    matrix
}

#[async_trait::async_trait]
impl Recommender for ContentRecommender {
    async fn try_recommend(&self, user_id: &str, limit: usize) -> RecommendResult {
        if self.catalog.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let ratings = fetch_ratings(self.store.as_ref()).await?;
        let user_ratings: Vec<&Rating> = ratings.iter().filter(|r| r.user_id == user_id).collect();

        if !user_ratings.is_empty() {
            return self.similar_to_top_rated(&user_ratings, limit);
        }

        if ratings.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(user_id = %user_id, raters = ratings.len(), "Cold-start content recommendation");
        self.predicted_for_new_user(&ratings, limit)
    }

    fn name(&self) -> &'static str {
        "content"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockDocumentStore};
    use crate::error::AppError;
    use crate::services::inference::MockContentModel;
    use serde_json::json;

    fn catalog() -> Arc<ArticleCatalog> {
        Arc::new(ArticleCatalog::from_articles(vec![
            Article::new(11, "Neural Nets", 50, &["neural networks"]),
            Article::new(22, "Descent", 10, &["gradient descent"]),
            Article::new(33, "Recipes", 10, &["cooking recipes"]),
            Article::new(44, "Deep Networks", 5, &["deep neural networks"]),
        ]))
    }

    async fn store_with(ratings: &[Rating]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (i, rating) in ratings.iter().enumerate() {
            store
                .insert("ratings", &format!("r{:03}", i), serde_json::to_value(rating).unwrap())
                .await
                .unwrap();
        }
        store
    }

    fn recommender(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<ArticleCatalog>,
        model: Option<Arc<dyn ContentModel>>,
    ) -> ContentRecommender {
        let index = Arc::new(KeywordSimilarityIndex::build(&catalog));
        ContentRecommender::new(store, catalog, index, model)
    }

    fn ids(articles: &[Article]) -> Vec<i64> {
        articles.iter().map(|a| a.article_id.0).collect()
    }

    #[tokio::test]
    async fn test_closer_keywords_rank_first() {
        let catalog = Arc::new(ArticleCatalog::from_articles(vec![
            Article::new(1, "Neural", 10, &["neural networks"]),
            Article::new(2, "Descent", 10, &["gradient descent"]),
            Article::new(3, "Cooking", 10, &["cooking recipes"]),
        ]));
        let store = store_with(&[Rating::new("u-1", 1, 5)]).await;

        let result = recommender(store, catalog, None)
            .try_recommend("u-1", 10)
            .await
            .unwrap();

        assert_eq!(ids(&result), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_never_returns_rated_articles() {
        let store = store_with(&[
            Rating::new("u-1", 11, 5),
            Rating::new("u-1", 44, 2),
            Rating::new("u-2", 22, 4),
        ])
        .await;

        let result = recommender(store, catalog(), None)
            .try_recommend("u-1", 10)
            .await
            .unwrap();

        assert!(!result.iter().any(|a| a.article_id == ArticleId(11)));
        assert!(!result.iter().any(|a| a.article_id == ArticleId(44)));
        assert_eq!(ids(&result), vec![22, 33]);
    }

    #[tokio::test]
    async fn test_top_rated_first_maximum_wins() {
        let store = store_with(&[Rating::new("u-1", 33, 5), Rating::new("u-1", 11, 5)]).await;
        let recommender = recommender(store, catalog(), None);

        let result = recommender.try_recommend("u-1", 2).await.unwrap();
        // Seeded from article 33: its neighbours all score zero, so catalog order
        // picks 11 and 22, and 11 is already rated
        assert_eq!(ids(&result), vec![22]);
    }

    #[tokio::test]
    async fn test_output_sorted_by_citations() {
        let store = store_with(&[Rating::new("u-1", 44, 5)]).await;

        let result = recommender(store, catalog(), None)
            .try_recommend("u-1", 10)
            .await
            .unwrap();

        assert_eq!(ids(&result), vec![11, 22, 33]);
        assert!(result.windows(2).all(|w| w[0].cited_by >= w[1].cited_by));
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let store = store_with(&[Rating::new("u-1", 44, 5)]).await;
        let result = recommender(store, catalog(), None)
            .try_recommend("u-1", 2)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_top_rated_article_missing_from_catalog() {
        let store = store_with(&[Rating::new("u-1", 777, 5)]).await;
        let recommender = recommender(store, catalog(), None);

        let result = recommender.try_recommend("u-1", 10).await;
        assert!(matches!(
            result,
            Err(RecommendError::ArticleNotInCatalog(ArticleId(777)))
        ));
        assert!(recommender.recommend("u-1", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_ratings_returns_empty_without_model() {
        let mut model = MockContentModel::new();
        model.expect_predict().never();
        let store = store_with(&[]).await;

        let result = recommender(store, catalog(), Some(Arc::new(model)))
            .try_recommend("u-1", 10)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_returns_empty() {
        let store = store_with(&[Rating::new("u-1", 11, 5)]).await;
        let result = recommender(store, Arc::new(ArticleCatalog::default()), None)
            .try_recommend("u-1", 10)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_uses_model_prediction_for_requester_row() {
        let mut model = MockContentModel::new();
        model.expect_predict().times(1).returning(|input| {
            // Two raters plus the trailing zero row for the requester
            assert_eq!(input.rows(), 3);
            assert_eq!(input.cols(), 4);
            assert_eq!(input.row(2), &[0.0, 0.0, 0.0, 0.0]);
            let mut output = RatingMatrix::zeros(input.rows(), input.cols());
            for (col, score) in [0.1, 0.9, 0.8, 0.2].into_iter().enumerate() {
                output.set(2, col, score);
            }
            Ok(output)
        });
        let store = store_with(&[Rating::new("u-1", 11, 5), Rating::new("u-2", 22, 3)]).await;

        let result = recommender(store, catalog(), Some(Arc::new(model)))
            .try_recommend("newcomer", 2)
            .await
            .unwrap();

        // Positions 1 and 2 predicted highest; equal citations keep prediction order
        assert_eq!(ids(&result), vec![22, 33]);
    }

    #[tokio::test]
    async fn test_cold_start_without_model_degrades_to_empty() {
        let store = store_with(&[Rating::new("u-1", 11, 5)]).await;
        let recommender = recommender(store, catalog(), None);

        assert!(matches!(
            recommender.try_recommend("newcomer", 10).await,
            Err(RecommendError::ModelUnavailable("content"))
        ));
        assert!(recommender.recommend("newcomer", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_inference_failure_degrades_to_empty() {
        let mut model = MockContentModel::new();
        model.expect_predict().returning(|input| {
            Err(InferenceError::ShapeMismatch {
                expected: 100,
                actual: input.cols(),
            })
        });
        let store = store_with(&[Rating::new("u-1", 11, 5)]).await;

        let result = recommender(store, catalog(), Some(Arc::new(model)))
            .recommend("newcomer", 10)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_empty() {
        let mut store = MockDocumentStore::new();
        store
            .expect_scan()
            .returning(|_| Err(AppError::Internal("timeout".to_string())));

        let result = recommender(Arc::new(store), catalog(), None)
            .recommend("u-1", 10)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_idempotent_without_writes() {
        let store = store_with(&[Rating::new("u-1", 11, 4), Rating::new("u-2", 44, 5)]).await;
        let recommender = recommender(store, catalog(), None);

        let first = recommender.recommend("u-1", 10).await;
        let second = recommender.recommend("u-1", 10).await;
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_rating_matrix_skips_unknown_articles() {
        let ratings = vec![
            Rating::new("u-1", 22, 4),
            Rating::new("u-2", 999, 5),
            Rating::new("u-1", 44, 2),
        ];
        let matrix = build_rating_matrix(&ratings, &catalog());

        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.row(0), &[0.0, 4.0, 0.0, 2.0]);
        assert_eq!(matrix.row(1), &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(matrix.row(2), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_malformed_rating_documents_are_ignored() {
        let store = store_with(&[Rating::new("u-1", 44, 5)]).await;
        store
            .insert("ratings", "zzz", json!({"user_id": "u-1", "article_id": "not a number"}))
            .await
            .unwrap();

        let result = recommender(store, catalog(), None)
            .try_recommend("u-1", 10)
            .await
            .unwrap();
        assert_eq!(result.len(), 3);
    }
}
