//! Ambient-identity credential infrastructure.
//!
//! Azure resources running with a managed identity obtain tokens from the
//! instance metadata service (IMDS) without any static secret in code or
//! configuration. The [`TokenCredential`] trait abstracts that acquisition so
//! every consumer — the Key Vault secret store, the blob download in the
//! listener — takes an injected credential and can be exercised in tests with
//! a [`StaticCredential`] instead of a live metadata endpoint.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Shared by the other infrastructure crates; the
//! [`relay`] domain crate never sees a token.

use async_trait::async_trait;
use relay::RelayError;
use serde::Deserialize;

/// Default IMDS token endpoint, reachable only from inside an Azure VM,
/// container instance, or function host.
const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// IMDS protocol version. Fixed; bump only with a deliberate protocol review.
const IMDS_API_VERSION: &str = "2018-02-01";

/// AAD resource identifier for Key Vault data-plane tokens.
pub const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// AAD resource identifier for Storage data-plane tokens.
pub const STORAGE_RESOURCE: &str = "https://storage.azure.com/";

// ---------------------------------------------------------------------------
// Access token
// ---------------------------------------------------------------------------

/// A bearer token scoped to one AAD resource.
///
/// `Debug` is redacted; the raw value is only read when the `Authorization`
/// header is built.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token for use in an `Authorization: Bearer` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Credential trait
// ---------------------------------------------------------------------------

/// Produces bearer tokens for a given AAD resource.
///
/// Implementations must be injectable wherever a token is needed; nothing in
/// the workspace constructs a credential inline.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquires a token for `resource` (e.g. [`VAULT_RESOURCE`]).
    ///
    /// Fails with [`RelayError::Authentication`] when ambient identity cannot
    /// be established.
    async fn get_token(&self, resource: &str) -> Result<AccessToken, RelayError>;
}

// ---------------------------------------------------------------------------
// Managed identity (IMDS)
// ---------------------------------------------------------------------------

/// Shape of the IMDS token response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
}

/// The production credential: queries the instance metadata service.
///
/// No caching — every call is a fresh round-trip, matching the relay's
/// no-freshness-logic stance. IMDS itself caches tokens server-side, so the
/// cost is one local HTTP hop.
pub struct ManagedIdentityCredential {
    client: reqwest::Client,
    endpoint: String,
}

impl ManagedIdentityCredential {
    /// Creates a credential against the well-known IMDS endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(IMDS_TOKEN_ENDPOINT)
    }

    /// Creates a credential against a custom token endpoint (tests only).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for ManagedIdentityCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, resource: &str) -> Result<AccessToken, RelayError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("api-version", IMDS_API_VERSION), ("resource", resource)])
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|err| RelayError::Authentication {
                reason: format!("instance metadata service unreachable: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Authentication {
                reason: format!("instance metadata service returned {status}: {body}"),
            });
        }

        let token: ImdsTokenResponse =
            response
                .json()
                .await
                .map_err(|err| RelayError::Authentication {
                    reason: format!("malformed token response: {err}"),
                })?;

        Ok(AccessToken::new(token.access_token))
    }
}

// ---------------------------------------------------------------------------
// Static credential (tests / local development)
// ---------------------------------------------------------------------------

/// A credential that hands out one fixed token regardless of resource.
#[derive(Clone)]
pub struct StaticCredential {
    token: AccessToken,
}

impl StaticCredential {
    /// Wraps a fixed token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(&self, _resource: &str) -> Result<AccessToken, RelayError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    use super::*;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJ0eXAi.super.secret");
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[tokio::test]
    async fn managed_identity_sends_metadata_header_and_resource() {
        let app = Router::new().route(
            "/token",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(headers.get("Metadata").unwrap(), "true");
                    assert_eq!(params.get("resource").unwrap(), VAULT_RESOURCE);
                    Json(serde_json::json!({
                        "access_token": "imds-token",
                        "expires_in": "86400",
                        "token_type": "Bearer"
                    }))
                },
            ),
        );
        let base = spawn(app).await;

        let credential = ManagedIdentityCredential::with_endpoint(format!("{base}/token"));
        let token = credential.get_token(VAULT_RESOURCE).await.unwrap();
        assert_eq!(token.secret(), "imds-token");
    }

    #[tokio::test]
    async fn unreachable_metadata_service_is_an_authentication_error() {
        // Nothing listens on this port.
        let credential = ManagedIdentityCredential::with_endpoint("http://127.0.0.1:9/token");
        let err = credential.get_token(VAULT_RESOURCE).await.unwrap_err();
        assert!(matches!(err, RelayError::Authentication { .. }));
    }

    #[tokio::test]
    async fn error_status_from_metadata_service_is_an_authentication_error() {
        let app = Router::new().route(
            "/token",
            get(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    "identity not assigned",
                )
            }),
        );
        let base = spawn(app).await;

        let credential = ManagedIdentityCredential::with_endpoint(format!("{base}/token"));
        let err = credential.get_token(VAULT_RESOURCE).await.unwrap_err();
        match err {
            RelayError::Authentication { reason } => {
                assert!(reason.contains("identity not assigned"))
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn static_credential_returns_the_fixed_token() {
        let credential = StaticCredential::new("fixed");
        let token = credential.get_token(STORAGE_RESOURCE).await.unwrap();
        assert_eq!(token.secret(), "fixed");
    }
}
