use crate::{
    db::{collections, DocumentStore},
    error::AppError,
    models::{Article, ArticleId, Rating},
    services::inference::InferenceError,
};

/// Why a recommendation run produced no list
#[derive(thiserror::Error, Debug)]
pub enum RecommendError {
    #[error("document store failure: {0}")]
    Store(#[from] AppError),

    #[error("{0} model is not loaded")]
    ModelUnavailable(&'static str),

    #[error("model inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("article {0} is not in the catalog")]
    ArticleNotInCatalog(ArticleId),
}

pub type RecommendResult = Result<Vec<Article>, RecommendError>;

/// A recommendation strategy
///
/// Implementors return a typed result from [`Recommender::try_recommend`]; the
/// provided [`Recommender::recommend`] is the boundary that logs failures and
/// degrades them to an empty list, so callers cannot tell "nothing to
/// recommend" from "internal failure".
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Ranked articles for a user, at most `limit` long
    async fn try_recommend(&self, user_id: &str, limit: usize) -> RecommendResult;

    /// Strategy name for logging
    fn name(&self) -> &'static str;

    async fn recommend(&self, user_id: &str, limit: usize) -> Vec<Article> {
        match self.try_recommend(user_id, limit).await {
            Ok(articles) => {
                tracing::info!(
                    strategy = self.name(),
                    user_id = %user_id,
                    count = articles.len(),
                    "Recommendations generated"
                );
                articles
            }
            Err(e) => {
                tracing::warn!(
                    strategy = self.name(),
                    user_id = %user_id,
                    error = %e,
                    "Recommendation failed, returning empty list"
                );
                Vec::new()
            }
        }
    }
}

/// Reads every rating, skipping documents that do not parse
pub async fn fetch_ratings(store: &dyn DocumentStore) -> Result<Vec<Rating>, RecommendError> {
    let docs = store.scan(collections::RATINGS).await?;

    Ok(docs
        .iter()
        .filter_map(|doc| match doc.parse::<Rating>() {
            Ok(rating) => Some(rating),
            Err(e) => {
                tracing::warn!(document_id = %doc.id, error = %e, "Skipping malformed rating");
                None
            }
        })
        .collect())
}

/// Presentation order: most cited first, ties keep the incoming (score) order
pub fn sort_by_citations(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.cited_by.cmp(&a.cited_by));
}

/// Indices of the `k` highest scores, best first; equal scores keep input order
///
/// NaN ranks below every real score.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let rank = |i: usize| if scores[i].is_nan() { f32::NEG_INFINITY } else { scores[i] };
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| rank(b).total_cmp(&rank(a)));
    indices.truncate(k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_citations_is_stable() {
        let mut articles = vec![
            Article::new(1, "a", 5, &[]),
            Article::new(2, "b", 9, &[]),
            Article::new(3, "c", 5, &[]),
        ];
        sort_by_citations(&mut articles);
        let ids: Vec<i64> = articles.iter().map(|a| a.article_id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_top_k_indices() {
        assert_eq!(top_k_indices(&[0.1, 0.9, 0.5, 0.9], 3), vec![1, 3, 2]);
        assert_eq!(top_k_indices(&[0.1], 3), vec![0]);
        assert!(top_k_indices(&[], 3).is_empty());
    }

    #[test]
    fn test_top_k_indices_ranks_nan_last() {
        assert_eq!(top_k_indices(&[0.9, f32::NAN], 1), vec![0]);
        assert_eq!(top_k_indices(&[f32::NAN, -1.0, 0.2], 3), vec![2, 1, 0]);
    }

    struct Failing;

    #[async_trait::async_trait]
    impl Recommender for Failing {
        async fn try_recommend(&self, _user_id: &str, _limit: usize) -> RecommendResult {
            Err(RecommendError::ModelUnavailable("test"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_boundary_turns_errors_into_empty_list() {
        assert!(Failing.recommend("u-1", 10).await.is_empty());
    }
}
