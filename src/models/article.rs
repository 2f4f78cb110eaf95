use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

use super::{lenient_i64, lenient_i64_or_zero};

/// Stable, externally visible article identifier
///
/// Distinct from [`CatalogPosition`]: ids are not guaranteed to be a dense `0..n` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(pub i64);

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient_i64(deserializer).map(ArticleId)
    }
}

impl Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(ArticleId)
    }
}

/// Zero-based index into the in-memory article catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogPosition(pub usize);

/// Keyword field as found in stored article documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Text(String),
    #[default]
    Missing,
}

impl Keywords {
    /// Flattens the keywords into a single document for vectorization
    pub fn flatten(&self) -> String {
        match self {
            Keywords::List(items) => items.join("; "),
            Keywords::Text(text) => text.clone(),
            Keywords::Missing => String::new(),
        }
    }
}

/// A scholarly article from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: ArticleId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_i64_or_zero")]
    pub year: i64,
    #[serde(default, deserialize_with = "lenient_i64_or_zero")]
    pub cited_by: i64,
    #[serde(default)]
    pub index_keywords: Keywords,
    /// Remaining document fields (authors, doi, ...) passed through to clients untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Article {
    pub fn new(article_id: i64, title: &str, cited_by: i64, keywords: &[&str]) -> Self {
        Self {
            article_id: ArticleId(article_id),
            title: title.to_string(),
            year: 0,
            cited_by,
            index_keywords: Keywords::List(keywords.iter().map(|k| k.to_string()).collect()),
            extra: serde_json::Map::new(),
        }
    }

    /// Keyword text used for TF-IDF and category filtering
    pub fn keyword_text(&self) -> String {
        self.index_keywords.flatten()
    }
}
