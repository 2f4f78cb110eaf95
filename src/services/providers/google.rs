//! Google sign-in provider
//!
//! Confirms ID tokens against Google's tokeninfo endpoint. The endpoint checks
//! the signature and expiry; issuer and audience are checked here.

use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{IdentityProvider, VerifiedIdentity};
use crate::error::{AppError, AppResult};

const VALID_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Clone)]
pub struct GoogleIdentityProvider {
    http_client: HttpClient,
    tokeninfo_url: String,
    /// Expected `aud` claim; audience is not checked when unset
    client_id: Option<String>,
}

/// Claims returned by the tokeninfo endpoint
#[derive(Debug, Deserialize)]
struct TokenInfo {
    iss: String,
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(tokeninfo_url: String, client_id: Option<String>) -> Self {
        if client_id.is_none() {
            tracing::warn!("GOOGLE_CLIENT_ID is not set, token audience will not be checked");
        }

        Self {
            http_client: HttpClient::new(),
            tokeninfo_url,
            client_id,
        }
    }

    /// Validates tokeninfo claims and extracts the identity
    fn identity_from_claims(&self, info: TokenInfo) -> AppResult<VerifiedIdentity> {
        if !VALID_ISSUERS.contains(&info.iss.as_str()) {
            return Err(AppError::Unauthorized("Wrong issuer.".to_string()));
        }

        if let Some(expected) = &self.client_id {
            if info.aud.as_deref() != Some(expected.as_str()) {
                return Err(AppError::Unauthorized("Token audience mismatch".to_string()));
            }
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("Token carries no email".to_string()))?;

        Ok(VerifiedIdentity {
            email,
            name: info.name.filter(|n| !n.trim().is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        if token.trim().is_empty() {
            return Err(AppError::InvalidInput("Token is missing".to_string()));
        }

        let response = self
            .http_client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await?;

        // tokeninfo answers 400 for expired or forged tokens
        if response.status().is_client_error() {
            tracing::info!(status = %response.status(), "Google rejected ID token");
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Google tokeninfo returned status {}: {}",
                status, body
            )));
        }

        let info: TokenInfo = response.json().await?;
        let identity = self.identity_from_claims(info)?;

        tracing::info!(provider = self.name(), "ID token verified");

        Ok(identity)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(client_id: Option<&str>) -> GoogleIdentityProvider {
        GoogleIdentityProvider::new(
            "http://localhost/tokeninfo".to_string(),
            client_id.map(str::to_string),
        )
    }

    fn claims(json: &str) -> TokenInfo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepts_both_issuer_spellings() {
        let p = provider(None);
        for iss in VALID_ISSUERS {
            let info = claims(&format!(
                r#"{{"iss": "{}", "email": "ada@example.org", "name": "Ada"}}"#,
                iss
            ));
            let identity = p.identity_from_claims(info).unwrap();
            assert_eq!(identity.email, "ada@example.org");
            assert_eq!(identity.name.as_deref(), Some("Ada"));
        }
    }

    #[test]
    fn test_rejects_foreign_issuer() {
        let info = claims(r#"{"iss": "evil.example.com", "email": "ada@example.org"}"#);
        assert!(matches!(
            provider(None).identity_from_claims(info),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_audience_checked_when_configured() {
        let p = provider(Some("client-1"));

        let wrong = claims(r#"{"iss": "accounts.google.com", "aud": "client-2", "email": "a@b.c"}"#);
        assert!(p.identity_from_claims(wrong).is_err());

        let right = claims(r#"{"iss": "accounts.google.com", "aud": "client-1", "email": "a@b.c"}"#);
        let identity = p.identity_from_claims(right).unwrap();
        assert_eq!(identity.name, None);
    }

    #[test]
    fn test_missing_email_is_rejected() {
        let info = claims(r#"{"iss": "accounts.google.com", "email": " "}"#);
        assert!(matches!(
            provider(None).identity_from_claims(info),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_token_is_invalid_input() {
        let result = provider(None).verify("  ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
