use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{
    catalog::ArticleCatalog,
    encoding::EncodingTable,
    inference::{ArticleIndex, CollaborativeModel, InferenceError, UserIndex},
    recommendations::{
        fetch_ratings, sort_by_citations, top_k_indices, RecommendError, RecommendResult,
        Recommender,
    },
};
use crate::{
    db::{collections, DocumentStore},
    models::{Article, ArticleId, Rating},
};

/// Collaborative-filtering recommendations
///
/// Every call re-reads users, ratings and articles and rebuilds the encodings.
/// Known users are scored by the embedding model over the articles they have
/// not rated; unknown users get the highest average-rated articles.
pub struct CollaborativeRecommender {
    store: Arc<dyn DocumentStore>,
    model: Option<Arc<dyn CollaborativeModel>>,
}

impl CollaborativeRecommender {
    pub fn new(store: Arc<dyn DocumentStore>, model: Option<Arc<dyn CollaborativeModel>>) -> Self {
        Self { store, model }
    }

    async fn fetch_user_ids(&self) -> Result<HashSet<String>, RecommendError> {
        let docs = self.store.scan(collections::USERS).await?;
        Ok(docs.into_iter().map(|doc| doc.id).collect())
    }

    /// Model-scored articles for a user present in the encoding
    fn personalized(
        &self,
        user: UserIndex,
        user_id: &str,
        ratings: &[Rating],
        encodings: &EncodingTable,
        articles: &ArticleCatalog,
        limit: usize,
    ) -> RecommendResult {
        let rated: HashSet<ArticleId> = ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.article_id)
            .collect();

        let candidates: Vec<ArticleId> = encodings
            .articles
            .keys()
            .iter()
            .filter(|id| !rated.contains(*id))
            .copied()
            .collect();

        if candidates.is_empty() {
            tracing::debug!(user_id = %user_id, "User has rated every encoded article");
            return Ok(Vec::new());
        }

        let model = self
            .model
            .as_ref()
            .ok_or(RecommendError::ModelUnavailable("collaborative"))?;

        let pairs: Vec<(UserIndex, ArticleIndex)> = candidates
            .iter()
            .filter_map(|&id| encodings.article(id).map(|article| (user, article)))
            .collect();

        let scores = model.predict(&pairs)?;
        if scores.len() != pairs.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: pairs.len(),
                actual: scores.len(),
            }
            .into());
        }

        // Scores choose the set; citation count decides display order
        let mut selected: Vec<Article> = top_k_indices(&scores, limit)
            .into_iter()
            .filter_map(|i| articles.get(candidates[i]))
            .cloned()
            .collect();

        sort_by_citations(&mut selected);
        Ok(selected)
    }
}

/// Highest mean rating first, for users the model knows nothing about
///
/// Takes `limit + 1` top-averaged ids so one vanished article does not shorten
/// the list, then caps the result at `limit`.
pub fn popular_articles(ratings: &[Rating], articles: &ArticleCatalog, limit: usize) -> Vec<Article> {
    let mut order: Vec<ArticleId> = Vec::new();
    let mut totals: HashMap<ArticleId, (i64, u32)> = HashMap::new();
    for rating in ratings {
        let entry = totals.entry(rating.article_id).or_insert_with(|| {
            order.push(rating.article_id);
            (0, 0)
        });
        entry.0 += rating.value;
        entry.1 += 1;
    }

    let averages: Vec<f32> = order
        .iter()
        .map(|id| {
            let (sum, count) = totals[id];
            sum as f32 / count as f32
        })
        .collect();

    let mut selected: Vec<Article> = top_k_indices(&averages, limit.saturating_add(1))
        .into_iter()
        .filter_map(|i| articles.get(order[i]))
        .take(limit)
        .cloned()
        .collect();

    sort_by_citations(&mut selected);
    selected
}

#[async_trait::async_trait]
impl Recommender for CollaborativeRecommender {
    async fn try_recommend(&self, user_id: &str, limit: usize) -> RecommendResult {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let users = self.fetch_user_ids().await?;
        let ratings = fetch_ratings(self.store.as_ref()).await?;
        let articles = ArticleCatalog::fetch(self.store.as_ref()).await?;

        let article_ids: HashSet<ArticleId> = articles.all().iter().map(|a| a.article_id).collect();
        let encodings = EncodingTable::build(&ratings, &users, &article_ids);

        tracing::debug!(
            users = encodings.users.len(),
            articles = encodings.articles.len(),
            ratings = ratings.len(),
            "Encodings built"
        );

        match encodings.user(user_id) {
            Some(user) => self.personalized(user, user_id, &ratings, &encodings, &articles, limit),
            None => {
                tracing::debug!(user_id = %user_id, "Unknown user, falling back to popularity");
                Ok(popular_articles(&ratings, &articles, limit))
            }
        }
    }

    fn name(&self) -> &'static str {
        "collaborative"
    }
}
