//! Identity provider abstraction
//!
//! Account upgrades hand an opaque token from the client to a provider,
//! which confirms it and returns the email and display name behind it.

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub mod google;

pub use google::GoogleIdentityProvider;

/// Identity confirmed by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Trait for external identity providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a client-supplied token
    ///
    /// Returns `Unauthorized` when the provider rejects the token.
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
