//! Key Vault secret-store infrastructure adapter.
//!
//! Implements the [`relay::SecretStore`] trait over the Key Vault REST API
//! (`GET https://{vault}.vault.azure.net/secrets/{name}`), authenticating with
//! a bearer token from the injected [`TokenCredential`] chain.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, token acquisition, status-code
//! mapping, and response parsing live here. The [`relay`] crate sees only
//! [`relay::SecretStore`].
//!
//! ## Caching
//!
//! None. Every `get_secret` call acquires a token and performs a fresh
//! round-trip to the vault. One secret read per triggering event keeps the
//! relay stateless; latency is traded away for simplicity.

use std::sync::Arc;

use async_trait::async_trait;
use identity::{TokenCredential, VAULT_RESOURCE};
use relay::{RelayError, SecretName, SecretStore, VaultName};
use serde::Deserialize;
use tracing::debug;

/// Key Vault REST API version used for secret reads.
const VAULT_API_VERSION: &str = "7.4";

/// Shape of a Key Vault `get secret` response. Extra fields (attributes,
/// tags, id) are ignored.
#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

/// Secret store backed by one Key Vault instance.
///
/// Construct via [`KeyVaultSecretStore::new`] with the vault name from
/// configuration; tests point it at an in-process fake with
/// [`KeyVaultSecretStore::with_base_url`].
pub struct KeyVaultSecretStore {
    client: reqwest::Client,
    base_url: String,
    credential: Arc<dyn TokenCredential>,
}

impl KeyVaultSecretStore {
    /// Creates a store for `https://{vault}.vault.azure.net`.
    pub fn new(vault: &VaultName, credential: Arc<dyn TokenCredential>) -> Self {
        Self::with_base_url(format!("https://{vault}.vault.azure.net"), credential)
    }

    /// Creates a store against an explicit base URL (tests only).
    pub fn with_base_url(base_url: impl Into<String>, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credential,
        }
    }
}

#[async_trait]
impl SecretStore for KeyVaultSecretStore {
    async fn get_secret(&self, name: &SecretName) -> Result<String, RelayError> {
        let token = self.credential.get_token(VAULT_RESOURCE).await?;

        debug!(secret = %name, "fetching secret from key vault");
        let response = self
            .client
            .get(format!("{}/secrets/{}", self.base_url, name))
            .query(&[("api-version", VAULT_API_VERSION)])
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|err| RelayError::SecretStore {
                message: format!("vault unreachable: {err}"),
            })?;

        let status = response.status();
        match status.as_u16() {
            200 => {}
            401 | 403 => {
                return Err(RelayError::AccessDenied {
                    secret: name.clone(),
                })
            }
            404 => {
                return Err(RelayError::SecretNotFound {
                    secret: name.clone(),
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::SecretStore {
                    message: format!("vault returned {status}: {body}"),
                });
            }
        }

        let bundle: SecretBundle =
            response
                .json()
                .await
                .map_err(|err| RelayError::SecretStore {
                    message: format!("malformed secret bundle: {err}"),
                })?;

        Ok(bundle.value)
    }
}
