//! Pre-trained scoring models used at recommendation time.
//!
//! Models are opaque scorers with a fixed numeric contract. They are loaded once
//! at start-up from JSON weight files and shared read-only for the lifetime of
//! the process. A model that fails to load is simply absent.

use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub mod dense;
pub mod embedding;

pub use dense::DenseContentModel;
pub use embedding::EmbeddingCollaborativeModel;

/// Errors raised while loading or querying a model
#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid model weights: {0}")]
    InvalidWeights(String),

    #[error("input shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{kind} index {index} outside trained range 0..{limit}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        limit: usize,
    },
}

/// Dense encoded user index expected by the collaborative model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserIndex(pub usize);

/// Dense encoded article index expected by the collaborative model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArticleIndex(pub usize);

/// Row-major dense matrix of ratings or predicted preferences
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl RatingMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, InferenceError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(InferenceError::ShapeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

/// Predicts article preferences from a user × catalog rating matrix
#[cfg_attr(test, mockall::automock)]
pub trait ContentModel: Send + Sync {
    /// Returns a matrix of the same shape holding predicted preferences
    fn predict(&self, ratings: &RatingMatrix) -> Result<RatingMatrix, InferenceError>;
}

/// Scores encoded `(user, article)` pairs
#[cfg_attr(test, mockall::automock)]
pub trait CollaborativeModel: Send + Sync {
    /// Returns one affinity score per input pair, in input order
    fn predict(&self, pairs: &[(UserIndex, ArticleIndex)]) -> Result<Vec<f32>, InferenceError>;
}

/// Reads and validates a JSON weight file
pub fn load_weights<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| InferenceError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| InferenceError::Parse {
        path: display,
        source,
    })
}

/// Loads the content model, logging and returning `None` on failure
pub fn load_content_model(path: &Path) -> Option<Arc<dyn ContentModel>> {
    match DenseContentModel::load(path) {
        Ok(model) => {
            tracing::info!(path = %path.display(), articles = model.num_articles(), "Content model loaded");
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Content model unavailable, cold-start recommendations disabled");
            None
        }
    }
}

/// Loads the collaborative model, logging and returning `None` on failure
pub fn load_collaborative_model(path: &Path) -> Option<Arc<dyn CollaborativeModel>> {
    match EmbeddingCollaborativeModel::load(path) {
        Ok(model) => {
            tracing::info!(
                path = %path.display(),
                users = model.num_users(),
                articles = model.num_articles(),
                "Collaborative model loaded"
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Collaborative model unavailable, personalized recommendations disabled");
            None
        }
    }
}
