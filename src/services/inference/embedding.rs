use serde::Deserialize;
use std::path::Path;

use super::{load_weights, ArticleIndex, CollaborativeModel, InferenceError, UserIndex};

/// Matrix-factorization model over encoded users and articles
///
/// `score = sigmoid(user · article + user_bias + article_bias)`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingCollaborativeModel {
    user_embeddings: Vec<Vec<f32>>,
    article_embeddings: Vec<Vec<f32>>,
    user_bias: Vec<f32>,
    article_bias: Vec<f32>,
}

impl EmbeddingCollaborativeModel {
    pub fn new(
        user_embeddings: Vec<Vec<f32>>,
        article_embeddings: Vec<Vec<f32>>,
        user_bias: Vec<f32>,
        article_bias: Vec<f32>,
    ) -> Result<Self, InferenceError> {
        let model = Self {
            user_embeddings,
            article_embeddings,
            user_bias,
            article_bias,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let model: Self = load_weights(path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn num_users(&self) -> usize {
        self.user_embeddings.len()
    }

    pub fn num_articles(&self) -> usize {
        self.article_embeddings.len()
    }

    fn validate(&self) -> Result<(), InferenceError> {
        if self.user_bias.len() != self.user_embeddings.len()
            || self.article_bias.len() != self.article_embeddings.len()
        {
            return Err(InferenceError::InvalidWeights(
                "bias vectors must have one entry per embedding".to_string(),
            ));
        }

        let dim = self
            .user_embeddings
            .first()
            .or_else(|| self.article_embeddings.first())
            .map(Vec::len)
            .unwrap_or(0);
        let consistent = self
            .user_embeddings
            .iter()
            .chain(self.article_embeddings.iter())
            .all(|embedding| embedding.len() == dim);
        if !consistent {
            return Err(InferenceError::InvalidWeights(
                "all embeddings must share one dimension".to_string(),
            ));
        }
        Ok(())
    }
}

impl CollaborativeModel for EmbeddingCollaborativeModel {
    fn predict(&self, pairs: &[(UserIndex, ArticleIndex)]) -> Result<Vec<f32>, InferenceError> {
        pairs
            .iter()
            .map(|&(UserIndex(user), ArticleIndex(article))| {
                let user_vec = self.user_embeddings.get(user).ok_or(
                    InferenceError::IndexOutOfRange {
                        kind: "user",
                        index: user,
                        limit: self.num_users(),
                    },
                )?;
                let article_vec = self.article_embeddings.get(article).ok_or(
                    InferenceError::IndexOutOfRange {
                        kind: "article",
                        index: article,
                        limit: self.num_articles(),
                    },
                )?;

                let dot: f32 = user_vec.iter().zip(article_vec).map(|(u, a)| u * a).sum();
                let logit = dot + self.user_bias[user] + self.article_bias[article];
                Ok(1.0 / (1.0 + (-logit).exp()))
            })
            .collect()
    }
}
