//! Shared value types for the relay domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (event content must be valid UTF-8, the
//! webhook URL must never leak into logs) and participate in the handler flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::RelayError;
use crate::identifiers::{BlobName, InvocationId, SecretName};

// ---------------------------------------------------------------------------
// Notification event
// ---------------------------------------------------------------------------

/// The single transient entity of the system: one storage-change notification.
///
/// Created at trigger time from the platform-delivered object handle and
/// discarded once the notification attempt completes. Never stored, retried,
/// or replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Platform-assigned identifier of the triggering object.
    pub name: BlobName,
    /// Full textual payload of the object at trigger time.
    pub content: String,
    /// Correlation id for this invocation; carried through tracing spans.
    pub invocation: InvocationId,
    /// UTC wall-clock time at which the event was received.
    pub received_at: Timestamp,
}

impl NotificationEvent {
    /// Builds an event from the raw bytes of the triggering object.
    ///
    /// Fails with [`RelayError::Decode`] if the bytes are not valid UTF-8.
    /// There is no size bound: the platform delivers the whole object and the
    /// whole object is embedded in the notification.
    pub fn from_bytes(name: BlobName, bytes: Vec<u8>) -> Result<Self, RelayError> {
        let content = String::from_utf8(bytes).map_err(|source| RelayError::Decode {
            name: name.clone(),
            source: source.utf8_error(),
        })?;
        Ok(Self {
            name,
            content,
            invocation: InvocationId::new_random(),
            received_at: Timestamp::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Webhook URL
// ---------------------------------------------------------------------------

/// The resolved webhook endpoint.
///
/// The URL is a secret (Slack incoming-webhook URLs embed a capability token),
/// so `Debug` and `Display` are redacted; only [`WebhookUrl::as_str`] exposes
/// the value, at the point where the POST is issued.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(String);

impl WebhookUrl {
    /// Creates a [`WebhookUrl`], returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookUrl(<redacted>)")
    }
}

impl std::fmt::Display for WebhookUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Handler configuration, read once at startup and passed in.
///
/// The handler itself never touches the process environment; the composition
/// root (`cli`) builds this from `WEBHOOK_SECRET_NAME` and hands it over so
/// the flow stays pure and testable.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Name of the secret holding the webhook URL.
    pub secret_name: SecretName,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
