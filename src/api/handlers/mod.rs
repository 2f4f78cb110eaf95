use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

pub mod articles;
pub mod favorites;
pub mod ratings;
pub mod recommendations;
pub mod users;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Rejects absent or blank identifiers
fn require<'a>(field: &str, value: Option<&'a str>) -> AppResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(format!("Provide {}!", field))),
    }
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_trims_and_rejects_blank() {
        assert_eq!(require("user_id", Some(" u-1 ")).unwrap(), "u-1");
        assert!(require("user_id", Some("  ")).is_err());
        assert!(require("user_id", None).is_err());
    }
}
