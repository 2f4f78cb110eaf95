use serde_json::{json, Value};

use super::providers::IdentityProvider;
use crate::{
    db::{collections, fields, to_document, DocumentStore},
    error::{AppError, AppResult},
    models::User,
};

/// Loads a user, filling `user_id` from the document key for older records
pub async fn fetch_user(store: &dyn DocumentStore, user_id: &str) -> AppResult<User> {
    let doc = store
        .get(collections::USERS, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut user: User = serde_json::from_value(Value::Object(doc))?;
    if user.user_id.is_empty() {
        user.user_id = user_id.to_string();
    }
    Ok(user)
}

fn normalize_subject_area(subject_area: &str) -> AppResult<String> {
    let trimmed = subject_area.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Subject area is required".to_string()));
    }
    Ok(trimmed.to_lowercase())
}

/// Creates a guest account with a fresh id
pub async fn create_guest(store: &dyn DocumentStore, subject_area: &str) -> AppResult<User> {
    let subject_area = normalize_subject_area(subject_area)?;
    let user = User::guest(&subject_area);

    store
        .set(collections::USERS, &user.user_id, to_document(&user)?)
        .await?;

    tracing::info!(user_id = %user.user_id, subject_area = %subject_area, "Guest user created");

    Ok(user)
}

/// Changes the subject area of an existing user
pub async fn set_subject_area(
    store: &dyn DocumentStore,
    user_id: &str,
    subject_area: &str,
) -> AppResult<User> {
    let subject_area = normalize_subject_area(subject_area)?;

    store
        .update(
            collections::USERS,
            user_id,
            fields(json!({ "subject_area": subject_area })),
        )
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            other => other,
        })?;

    fetch_user(store, user_id).await
}

/// Attaches a verified identity to a guest account
///
/// The account keeps its `user_id`. When another account already holds the
/// email the guest is returned unchanged.
pub async fn upgrade_with_identity(
    store: &dyn DocumentStore,
    identity: &dyn IdentityProvider,
    user_id: &str,
    token: &str,
) -> AppResult<User> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "User ID must be provided and cannot be undefined".to_string(),
        ));
    }

    // 1. Confirm the token with the provider
    let verified = identity.verify(token).await?;

    // 2. Make sure the account exists before touching it
    let user = fetch_user(store, user_id).await?;

    // 3. Upgrade in place unless the email is already registered
    let holders = store
        .find_eq(collections::USERS, "email", &json!(verified.email))
        .await?;
    if !holders.is_empty() {
        tracing::info!(
            user_id = %user_id,
            provider = identity.name(),
            "Email already registered, leaving account unchanged"
        );
        return Ok(user);
    }

    store
        .update(
            collections::USERS,
            user_id,
            fields(json!({
                "email": verified.email,
                "name": verified.name.unwrap_or_default(),
            })),
        )
        .await?;

    tracing::info!(user_id = %user_id, provider = identity.name(), "Guest account upgraded");

    fetch_user(store, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::providers::{MockIdentityProvider, VerifiedIdentity};
    use tokio_test::assert_err;

    fn provider_for(email: &str) -> MockIdentityProvider {
        let email = email.to_string();
        let mut provider = MockIdentityProvider::new();
        provider.expect_verify().returning(move |_| {
            Ok(VerifiedIdentity {
                email: email.clone(),
                name: Some("Ada".to_string()),
            })
        });
        provider.expect_name().return_const("mock");
        provider
    }

    #[tokio::test]
    async fn test_create_guest_persists_user() {
        let store = MemoryStore::new();
        let user = create_guest(&store, "  Physics ").await.unwrap();

        let stored = fetch_user(&store, &user.user_id).await.unwrap();
        assert_eq!(stored.subject_area.as_deref(), Some("physics"));
        assert!(stored.is_guest());
        assert!(stored.rated_articles.is_empty());
    }

    #[tokio::test]
    async fn test_blank_subject_area_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            create_guest(&store, " ").await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_set_subject_area() {
        let store = MemoryStore::new();
        let user = create_guest(&store, "physics").await.unwrap();

        let updated = set_subject_area(&store, &user.user_id, "Biology").await.unwrap();
        assert_eq!(updated.subject_area.as_deref(), Some("biology"));

        let missing = set_subject_area(&store, "nobody", "biology").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_user_fills_id_from_document_key() {
        let store = MemoryStore::new();
        store
            .insert("users", "legacy", json!({"email": "", "subject_area": "math"}))
            .await
            .unwrap();

        let user = fetch_user(&store, "legacy").await.unwrap();
        assert_eq!(user.user_id, "legacy");
        assert!(user.is_guest());
    }

    #[tokio::test]
    async fn test_upgrade_keeps_user_id() {
        let store = MemoryStore::new();
        let guest = create_guest(&store, "physics").await.unwrap();

        let upgraded = upgrade_with_identity(&store, &provider_for("ada@example.org"), &guest.user_id, "tok")
            .await
            .unwrap();

        assert_eq!(upgraded.user_id, guest.user_id);
        assert_eq!(upgraded.email.as_deref(), Some("ada@example.org"));
        assert_eq!(upgraded.name.as_deref(), Some("Ada"));
        assert_eq!(upgraded.subject_area.as_deref(), Some("physics"));
    }

    #[tokio::test]
    async fn test_upgrade_with_registered_email_leaves_guest() {
        let store = MemoryStore::new();
        store
            .insert("users", "owner", json!({"user_id": "owner", "email": "ada@example.org"}))
            .await
            .unwrap();
        let guest = create_guest(&store, "physics").await.unwrap();

        let result = upgrade_with_identity(&store, &provider_for("ada@example.org"), &guest.user_id, "tok")
            .await
            .unwrap();

        assert!(result.is_guest());
        assert_eq!(result.user_id, guest.user_id);
    }

    #[tokio::test]
    async fn test_upgrade_rejected_token() {
        let store = MemoryStore::new();
        let guest = create_guest(&store, "physics").await.unwrap();

        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .returning(|_| Err(AppError::Unauthorized("Invalid token".to_string())));

        let result = upgrade_with_identity(&store, &provider, &guest.user_id, "bad").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(fetch_user(&store, &guest.user_id).await.unwrap().is_guest());
    }

    #[tokio::test]
    async fn test_upgrade_unknown_user() {
        let store = MemoryStore::new();
        assert_err!(
            upgrade_with_identity(&store, &provider_for("a@b.c"), "ghost", "tok").await
        );
    }
}
