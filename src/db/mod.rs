use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};

/// Field mapping of a stored document
pub type Document = serde_json::Map<String, Value>;

/// Collection names used by the service
pub mod collections {
    pub const ARTICLES: &str = "articles";
    pub const USERS: &str = "users";
    pub const RATINGS: &str = "ratings";
}

/// A document together with its id inside a collection
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Document) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Deserializes the document fields into a typed record
    pub fn parse<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Converts a serializable record into document fields
pub fn to_document<T: serde::Serialize>(record: &T) -> AppResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(crate::error::AppError::Internal(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Builds a partial document from a `json!` object literal
///
/// Anything other than an object yields an empty document.
pub fn fields(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Generic document store reachable by collection name and document id
///
/// Scans and equality queries return documents ordered by document id.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a single document
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Returns every document whose `field` equals `value`
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> AppResult<Vec<StoredDocument>>;

    /// Returns every document of the collection
    async fn scan(&self, collection: &str) -> AppResult<Vec<StoredDocument>>;

    /// Creates or replaces a document
    async fn set(&self, collection: &str, id: &str, fields: Document) -> AppResult<()>;

    /// Merges `fields` into an existing document
    ///
    /// Fails with `NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> AppResult<()>;

    /// Removes a document; deleting a missing document is not an error
    async fn delete(&self, collection: &str, id: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
