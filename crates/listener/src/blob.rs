//! Blob content download.
//!
//! Event Grid notifications carry the blob's URL but not its content; the
//! receiver downloads the body itself, authenticating with the same ambient
//! credential chain the secret store uses (storage data-plane resource).

use std::sync::Arc;

use identity::{TokenCredential, STORAGE_RESOURCE};
use relay::{BlobName, RelayError};
use tracing::debug;

/// Storage REST API version sent with every blob read.
const STORAGE_API_VERSION: &str = "2021-08-06";

/// Downloads blob bodies over HTTPS with bearer-token authentication.
pub struct BlobDownloader {
    client: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
}

impl BlobDownloader {
    /// Creates a downloader with the given credential chain.
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential,
        }
    }

    /// Fetches the raw bytes of the blob at `url`.
    ///
    /// Token-acquisition failures surface as [`RelayError::Authentication`];
    /// everything else (transport failure, non-success status) as
    /// [`RelayError::BlobFetch`]. No retry — the platform redelivers the
    /// event if the invocation fails.
    pub async fn fetch(&self, name: &BlobName, url: &str) -> Result<Vec<u8>, RelayError> {
        let token = self.credential.get_token(STORAGE_RESOURCE).await?;

        debug!(blob = %name, "downloading blob content");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.secret())
            .header("x-ms-version", STORAGE_API_VERSION)
            .send()
            .await
            .map_err(|err| RelayError::BlobFetch {
                name: name.clone(),
                message: format!("storage unreachable: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::BlobFetch {
                name: name.clone(),
                message: format!("storage returned {status}: {body}"),
            });
        }

        let bytes = response.bytes().await.map_err(|err| RelayError::BlobFetch {
            name: name.clone(),
            message: format!("body read failed: {err}"),
        })?;

        Ok(bytes.to_vec())
    }
}
