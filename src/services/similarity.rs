use std::time::Instant;

use aprender::primitives::Matrix;
use aprender::text::similarity::cosine_similarity;
use aprender::text::tokenize::WhitespaceTokenizer;
use aprender::text::vectorize::TfidfVectorizer;

use super::catalog::ArticleCatalog;
use crate::models::CatalogPosition;

/// Pairwise cosine similarity of article keywords, indexed by catalog position
///
/// Memory is `O(n²)` in the catalog size; built once at start-up and never
/// updated incrementally.
#[derive(Debug, Default)]
pub struct KeywordSimilarityIndex {
    size: usize,
    /// Row-major `size × size` matrix
    scores: Vec<f32>,
}

impl KeywordSimilarityIndex {
    /// Builds the index over every article of the catalog
    ///
    /// Keywords are vectorized with TF-IDF and English stop words removed.
    /// Articles without usable keywords only match themselves.
    pub fn build(catalog: &ArticleCatalog) -> Self {
        let start = Instant::now();
        let documents: Vec<String> = catalog
            .all()
            .iter()
            .map(|a| keyword_document(&a.keyword_text()))
            .collect();

        let size = documents.len();
        let mut scores = vec![0.0f32; size * size];
        for i in 0..size {
            scores[i * size + i] = 1.0;
        }

        let weights = vectorize(&documents);
        if let Some(matrix) = &weights {
            let rows: Vec<_> = (0..size).map(|i| matrix.row(i)).collect();
            for i in 0..size {
                for j in (i + 1)..size {
                    let score = cosine_similarity(&rows[i], &rows[j])
                        .map(|s| (s as f32).clamp(0.0, 1.0))
                        .unwrap_or(0.0);
                    scores[i * size + j] = score;
                    scores[j * size + i] = score;
                }
            }
        }

        tracing::info!(
            articles = size,
            vocabulary = weights.as_ref().map_or(0, |m| m.n_cols()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Keyword similarity index built"
        );

        Self { size, scores }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity of two catalog positions
    pub fn similarity(&self, a: CatalogPosition, b: CatalogPosition) -> Option<f32> {
        if a.0 >= self.size || b.0 >= self.size {
            return None;
        }
        Some(self.scores[a.0 * self.size + b.0])
    }

    /// Every `(other position, score)` pair for one article, in catalog order
    pub fn similarity_row(&self, position: CatalogPosition) -> Option<Vec<(CatalogPosition, f32)>> {
        if position.0 >= self.size {
            return None;
        }
        let row = &self.scores[position.0 * self.size..(position.0 + 1) * self.size];
        Some(
            row.iter()
                .enumerate()
                .map(|(other, &score)| (CatalogPosition(other), score))
                .collect(),
        )
    }

    /// The `k` most similar other articles, best first
    ///
    /// Ties keep catalog order. An unknown position yields an empty list.
    pub fn top_k_excluding_self(&self, position: CatalogPosition, k: usize) -> Vec<CatalogPosition> {
        let Some(mut row) = self.similarity_row(position) else {
            return Vec::new();
        };

        row.retain(|(other, _)| *other != position);
        row.sort_by(|a, b| b.1.total_cmp(&a.1));
        row.into_iter().take(k).map(|(other, _)| other).collect()
    }
}

/// TF-IDF weights of the documents, `None` when there is nothing to weigh
fn vectorize(documents: &[String]) -> Option<Matrix<f64>> {
    if documents.iter().all(|d| d.trim().is_empty()) {
        return None;
    }

    let mut vectorizer = TfidfVectorizer::new()
        .with_tokenizer(Box::new(WhitespaceTokenizer::new()))
        .with_stop_words_english();

    match vectorizer.fit_transform(documents) {
        Ok(matrix) => Some(matrix),
        Err(e) => {
            // Raised when every token is a stop word
            tracing::warn!(error = %e, "Keyword vectorization produced no terms");
            None
        }
    }
}

/// Lowercase word runs of two or more characters, separated by spaces
fn keyword_document(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .collect::<Vec<_>>()
        .join(" ")
}
