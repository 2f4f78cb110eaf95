use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{empty_as_none, ArticleId};

/// A reader of the service
///
/// Created as a guest (no email) on first interaction and upgraded in place
/// once an identity provider confirms an email. `user_id` never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Older documents only carry the id as their document key
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub subject_area: Option<String>,
    #[serde(default)]
    pub rated_articles: Vec<ArticleId>,
    #[serde(default)]
    pub favorite_articles: Vec<ArticleId>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a guest account for the given subject area
    pub fn guest(subject_area: &str) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            email: None,
            name: None,
            subject_area: Some(subject_area.to_lowercase()),
            rated_articles: Vec::new(),
            favorite_articles: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_user() {
        let user = User::guest("Computer Science");
        assert!(user.is_guest());
        assert_eq!(user.subject_area.as_deref(), Some("computer science"));
        assert!(Uuid::parse_str(&user.user_id).is_ok());
    }

    #[test]
    fn test_empty_email_means_guest() {
        let json = r#"{"user_id": "u-1", "email": "", "name": "", "rated_articles": ["4", 5]}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_guest());
        assert_eq!(user.name, None);
        assert_eq!(user.rated_articles, vec![ArticleId(4), ArticleId(5)]);
        assert!(user.favorite_articles.is_empty());
    }

    #[test]
    fn test_registered_user() {
        let json = r#"{"user_id": "u-2", "email": "ada@example.org"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_guest());
    }
}
