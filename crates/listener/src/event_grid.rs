//! Event Grid wire types.
//!
//! Event Grid delivers events in batches of JSON objects with a common
//! envelope; the payload under `data` depends on `eventType`. Only two event
//! types matter here: the subscription-validation handshake and
//! `Microsoft.Storage.BlobCreated`. Everything else is acknowledged and
//! dropped.

use relay::BlobName;
use serde::Deserialize;

/// Event type emitted when a blob lands in the watched container.
pub const BLOB_CREATED: &str = "Microsoft.Storage.BlobCreated";

/// Event type of the one-time handshake Event Grid performs when a webhook
/// subscription is created. The receiver must echo the validation code or the
/// subscription is never activated.
pub const SUBSCRIPTION_VALIDATION: &str = "Microsoft.EventGrid.SubscriptionValidationEvent";

/// One event in an Event Grid delivery batch.
///
/// `data` is kept as a raw value and parsed per event type; unknown event
/// types then need no schema at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEvent {
    /// Platform-assigned event id.
    #[serde(default)]
    pub id: String,
    /// Resource path of the subject, e.g.
    /// `/blobServices/default/containers/mycontainer/blobs/orders/2024-01-01.json`.
    #[serde(default)]
    pub subject: String,
    /// Discriminator for the `data` payload.
    pub event_type: String,
    /// Event-type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `data` payload of a [`BLOB_CREATED`] event. Extra fields (api, eTag,
/// contentLength, ...) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobCreatedData {
    /// Full HTTPS URL of the created blob.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionValidationData {
    validation_code: String,
}

impl EventGridEvent {
    /// Returns the validation code if this is a subscription-validation event.
    pub fn validation_code(&self) -> Option<String> {
        if self.event_type != SUBSCRIPTION_VALIDATION {
            return None;
        }
        serde_json::from_value::<SubscriptionValidationData>(self.data.clone())
            .ok()
            .map(|d| d.validation_code)
    }

    /// Returns the blob payload if this is a blob-created event with a
    /// well-formed `data` object.
    pub fn blob_created(&self) -> Option<BlobCreatedData> {
        if self.event_type != BLOB_CREATED {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Extracts the `container/path` blob name from an event subject.
///
/// Subjects look like
/// `/blobServices/default/containers/{container}/blobs/{path}`; the name the
/// rest of the system sees is `{container}/{path}`, matching what the storage
/// platform reports as the blob's full name.
pub fn blob_name_from_subject(subject: &str) -> Option<BlobName> {
    let rest = subject.split_once("/containers/")?.1;
    let (container, path) = rest.split_once("/blobs/")?;
    BlobName::new(format!("{container}/{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_parses_to_container_slash_path() {
        let name = blob_name_from_subject(
            "/blobServices/default/containers/mycontainer/blobs/orders/2024-01-01.json",
        )
        .unwrap();
        assert_eq!(name.as_str(), "mycontainer/orders/2024-01-01.json");
    }

    #[test]
    fn subject_without_blob_segment_is_rejected() {
        assert!(blob_name_from_subject("/blobServices/default/containers/mycontainer").is_none());
        assert!(blob_name_from_subject("").is_none());
        assert!(blob_name_from_subject("/blobServices/default/blobs/x").is_none());
    }

    #[test]
    fn validation_event_exposes_its_code() {
        let event: EventGridEvent = serde_json::from_value(serde_json::json!({
            "id": "2d1781af-3a4c",
            "eventType": SUBSCRIPTION_VALIDATION,
            "data": { "validationCode": "512d38b6-c7b8" }
        }))
        .unwrap();
        assert_eq!(event.validation_code().as_deref(), Some("512d38b6-c7b8"));
        assert!(event.blob_created().is_none());
    }

    #[test]
    fn blob_created_event_exposes_its_url() {
        let event: EventGridEvent = serde_json::from_value(serde_json::json!({
            "id": "9b87886d-21a8",
            "subject": "/blobServices/default/containers/mycontainer/blobs/a.txt",
            "eventType": BLOB_CREATED,
            "data": {
                "api": "PutBlob",
                "url": "https://myaccount.blob.core.windows.net/mycontainer/a.txt"
            }
        }))
        .unwrap();
        let data = event.blob_created().unwrap();
        assert_eq!(
            data.url,
            "https://myaccount.blob.core.windows.net/mycontainer/a.txt"
        );
        assert!(event.validation_code().is_none());
    }
}
