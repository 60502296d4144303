//! Error taxonomy for the relay domain.
//!
//! Two families with deliberately different propagation policies:
//!
//! - [`RelayError`] — fatal to the invocation. Decode and secret-resolution
//!   failures propagate out of the handler so the hosting platform marks the
//!   invocation failed and applies its own redelivery policy.
//! - [`DeliveryError`] — best-effort. Webhook delivery failures are caught by
//!   the handler, logged with the response detail, and swallowed; the
//!   invocation completes normally.
//!
//! Infrastructure crates map their transport errors into these variants at the
//! adapter boundary; no I/O error types cross into this crate.

use thiserror::Error;

use crate::identifiers::{BlobName, SecretName};

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

/// Errors that fail the invocation.
///
/// None of these are caught within the relay: they propagate to the event
/// source, which reports the invocation as failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The triggering object's bytes are not valid UTF-8 text.
    ///
    /// Raised before any secret lookup is attempted.
    #[error("Object '{name}' is not valid UTF-8 text")]
    Decode {
        /// Identifier of the object that failed to decode.
        name: BlobName,
        /// The underlying UTF-8 validation failure.
        #[source]
        source: std::str::Utf8Error,
    },

    /// Ambient identity could not be established.
    ///
    /// Produced by the credential chain before any secret-store request is
    /// made (e.g. the instance-metadata token endpoint is unreachable).
    #[error("Failed to establish ambient identity: {reason}")]
    Authentication {
        /// Description of the token-acquisition failure.
        reason: String,
    },

    /// The secret store refused access to the named secret (401/403).
    #[error("Access to secret '{secret}' was denied by the secret store")]
    AccessDenied {
        /// Name of the secret that was refused.
        secret: SecretName,
    },

    /// The named secret does not exist in the store (404).
    #[error("Secret '{secret}' was not found in the secret store")]
    SecretNotFound {
        /// Name of the missing secret.
        secret: SecretName,
    },

    /// Any other failure talking to the secret store (transport error,
    /// unexpected status, malformed response body).
    #[error("Secret store request failed: {message}")]
    SecretStore {
        /// Description of the failure.
        message: String,
    },

    /// The triggering object's content could not be downloaded.
    ///
    /// Produced by the Event Grid source; the single-shot source reads a
    /// local file and reports read failures here as well.
    #[error("Failed to fetch content of object '{name}': {message}")]
    BlobFetch {
        /// Identifier of the object whose content was requested.
        name: BlobName,
        /// Description of the download failure.
        message: String,
    },

    /// A required configuration value is missing or invalid.
    ///
    /// Produced at startup only; the relay never starts with an invalid
    /// configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Best-effort delivery errors
// ---------------------------------------------------------------------------

/// Webhook delivery failure.
///
/// Returned by [`crate::Notifier::notify`]; the handler logs it (including the
/// response body, so the operator can see what the webhook said) and returns
/// normally. Notification is best-effort by design.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The webhook responded with a status other than 200.
    #[error("Webhook returned status {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code received.
        status: u16,
        /// The response body, verbatim, for the error log line.
        body: String,
    },

    /// The POST never produced a response (connection refused, DNS failure,
    /// client-side timeout).
    #[error("Webhook request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
}
