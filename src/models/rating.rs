use serde::{Deserialize, Serialize};

use super::{lenient_i64, ArticleId};

/// A user's rating of a single article
///
/// At most one rating exists per `(user_id, article_id)` pair; the write path upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: String,
    pub article_id: ArticleId,
    /// Stored as `article_rating`. Range is not validated (1-5 in practice).
    #[serde(
        rename = "article_rating",
        alias = "value",
        deserialize_with = "lenient_i64"
    )]
    pub value: i64,
}

impl Rating {
    pub fn new(user_id: &str, article_id: i64, value: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            article_id: ArticleId(article_id),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_uses_stored_field_name() {
        let rating = Rating::new("u-1", 7, 4);
        let value = serde_json::to_value(&rating).unwrap();
        assert_eq!(value["article_rating"], 4);
        assert_eq!(value["article_id"], 7);
        assert!(value.get("value").is_none());
    }

    #[test]
    fn test_rating_accepts_string_ids_and_value_alias() {
        let json = r#"{"user_id": "u-1", "article_id": "7", "value": "5"}"#;
        let rating: Rating = serde_json::from_str(json).unwrap();
        assert_eq!(rating, Rating::new("u-1", 7, 5));
    }
}
