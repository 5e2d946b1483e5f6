//! Credential provider interface and implementations
//!
//! OAuth token exchange and refresh live outside this service; all the board
//! path needs is "give me a valid access token or fail".

use crate::error::{KioskError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A bearer token for the upstream scheduling API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trait for supplying a valid access token for the upstream API
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return the stored access token, or fail with `AuthenticationMissing`
    /// if no prior authentication exists.
    async fn access_token(&self) -> Result<AccessToken>;

    /// Whether a credential is currently stored (for health reporting)
    async fn has_credential(&self) -> bool;
}

/// Credential provider backed by a token handed over at startup
/// (configuration or environment).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    token: Option<AccessToken>,
}

impl StaticCredentialProvider {
    /// Provider with a stored token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(AccessToken::new(token)),
        }
    }

    /// Provider with no stored credential; every token request fails
    pub fn unauthenticated() -> Self {
        Self { token: None }
    }

    /// Build from an optional configured token
    pub fn from_config(token: Option<&str>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self::new(token),
            _ => Self::unauthenticated(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        self.token.clone().ok_or_else(|| {
            KioskError::AuthenticationMissing {
                message: "no access token configured; complete the kiosk sign-in first"
                    .to_string(),
            }
            .into()
        })
    }

    async fn has_credential(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stored_token_is_returned() {
        let provider = StaticCredentialProvider::new("secret-token");
        assert!(provider.has_credential().await);

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.as_str(), "secret-token");
    }

    #[tokio::test]
    async fn test_missing_token_fails_with_authentication_missing() {
        let provider = StaticCredentialProvider::unauthenticated();
        assert!(!provider.has_credential().await);

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KioskError>(),
            Some(KioskError::AuthenticationMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_config_treats_empty_token_as_missing() {
        assert!(!StaticCredentialProvider::from_config(Some(""))
            .has_credential()
            .await);
        assert!(!StaticCredentialProvider::from_config(None)
            .has_credential()
            .await);
        assert!(StaticCredentialProvider::from_config(Some("tok"))
            .has_credential()
            .await);
    }
}
