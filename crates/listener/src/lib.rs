//! Blob-relay trigger event source infrastructure.
//!
//! Receives storage-change notifications and turns each one into a
//! [`relay::NotificationEvent`] handed to the injected
//! [`relay::EventHandler`]:
//!
//! - [`EventGridReceiver`] — binds an HTTP endpoint and accepts Event Grid
//!   webhook deliveries for the watched container. Answers the
//!   subscription-validation handshake, downloads each created blob's content
//!   with the ambient credential chain, and invokes the handler once per
//!   blob-created event.
//!
//! A single-shot source (one event synthesised from a local file) needs no
//! transport and is assembled directly in the `cli` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, the Event Grid envelope, and blob
//! download all live here. The [`relay`] crate sees only
//! [`relay::EventHandler`] and [`relay::NotificationEvent`].
//!
//! ## Failure reporting
//!
//! Fatal handler errors (decode, secret resolution) are logged and reported
//! to Event Grid as HTTP 500, so the platform's own redelivery policy takes
//! over. Webhook delivery failures never reach this crate — the handler
//! swallows them after logging.

pub mod blob;
pub mod event_grid;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use relay::{EventHandler, NotificationEvent, RelayError};
use tracing::{debug, error, info, warn};

pub use blob::BlobDownloader;
pub use event_grid::EventGridEvent;

/// HTTP receiver for Event Grid blob-created subscriptions.
pub struct EventGridReceiver {
    handler: Arc<dyn EventHandler>,
    downloader: BlobDownloader,
}

impl EventGridReceiver {
    /// Creates a receiver that feeds events into `handler`.
    pub fn new(handler: Arc<dyn EventHandler>, downloader: BlobDownloader) -> Self {
        Self {
            handler,
            downloader,
        }
    }

    /// Builds the router exposing `POST /events`.
    pub fn into_router(self) -> Router {
        Router::new()
            .route("/events", post(receive))
            .with_state(Arc::new(self))
    }

    /// Serves the receiver on an already-bound listener until the process
    /// exits or the server fails.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> std::io::Result<()> {
        info!(addr = %listener.local_addr()?, "event grid receiver listening");
        axum::serve(listener, self.into_router()).await
    }

    /// Runs one invocation for one blob-created event.
    async fn process(&self, event: EventGridEvent) -> Result<(), RelayError> {
        let Some(name) = event_grid::blob_name_from_subject(&event.subject) else {
            // Not an invocation failure: redelivery would never help.
            warn!(id = %event.id, subject = %event.subject,
                "blob-created event with unrecognised subject; dropping");
            return Ok(());
        };
        let Some(data) = event.blob_created() else {
            warn!(id = %event.id, "blob-created event without a blob url; dropping");
            return Ok(());
        };

        let bytes = self.downloader.fetch(&name, &data.url).await?;
        let notification = NotificationEvent::from_bytes(name, bytes)?;
        self.handler.handle(notification).await
    }
}

/// `POST /events` — one Event Grid delivery (a batch of events).
async fn receive(
    State(receiver): State<Arc<EventGridReceiver>>,
    Json(events): Json<Vec<EventGridEvent>>,
) -> Response {
    // The validation handshake arrives as a single-event batch when the
    // subscription is created; echoing the code activates the subscription.
    if let Some(code) = events.iter().find_map(|e| e.validation_code()) {
        info!("answering event grid subscription-validation handshake");
        return Json(serde_json::json!({ "validationResponse": code })).into_response();
    }

    for event in events {
        if event.event_type != event_grid::BLOB_CREATED {
            debug!(id = %event.id, event_type = %event.event_type, "ignoring event");
            continue;
        }
        if let Err(err) = receiver.process(event).await {
            error!(error = %err, "invocation failed");
            // 5xx makes Event Grid redeliver per its own retry policy.
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    StatusCode::OK.into_response()
}
