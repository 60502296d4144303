//! Slack incoming-webhook infrastructure adapter.
//!
//! Implements the [`relay::Notifier`] trait: builds the `{"text": ...}`
//! message Slack's incoming webhooks accept and issues a single synchronous
//! POST. Other chat providers would be added as new crates implementing the
//! same trait without any changes to the `relay` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, payload shaping, and status handling
//! live here. The [`relay`] crate sees only [`relay::Notifier`].
//!
//! ## Delivery semantics
//!
//! One POST per invocation, no retry, no backoff, default client timeout.
//! Only HTTP 200 counts as delivered; every other status — Slack signals
//! problems like a revoked webhook with 4xx bodies such as `no_service` —
//! surfaces as a [`DeliveryError`] carrying the response body so the handler
//! can put it in the error log line.

use async_trait::async_trait;
use relay::{DeliveryError, Notifier, NotificationEvent, WebhookUrl};
use serde::Serialize;

/// The one-key JSON object Slack incoming webhooks accept.
#[derive(Debug, Serialize)]
struct SlackMessage {
    text: String,
}

/// Renders the human-readable notification text.
///
/// The wording is fixed; both the object name and its full content must be
/// embedded so the channel sees the update without opening the storage
/// account.
fn format_message(event: &NotificationEvent) -> String {
    format!(
        "Storage update received\n Name: {} \n Content: {}",
        event.name, event.content
    )
}

/// Webhook notifier for Slack.
#[derive(Default)]
pub struct SlackNotifier {
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Creates a notifier with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(
        &self,
        url: &WebhookUrl,
        event: &NotificationEvent,
    ) -> Result<(), DeliveryError> {
        let message = SlackMessage {
            text: format_message(event),
        };

        let response = self
            .client
            .post(url.as_str())
            .json(&message)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 200 {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use relay::BlobName;

    use super::*;

    fn test_event() -> NotificationEvent {
        NotificationEvent::from_bytes(
            BlobName::new("mycontainer/orders/2024-01-01.json").unwrap(),
            b"{\"id\":1}".to_vec(),
        )
        .unwrap()
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn message_has_exactly_one_key_embedding_name_and_content() {
        let message = SlackMessage {
            text: format_message(&test_event()),
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let text = object.get("text").unwrap().as_str().unwrap();
        assert!(text.contains("mycontainer/orders/2024-01-01.json"));
        assert!(text.contains("{\"id\":1}"));
    }

    #[tokio::test]
    async fn delivers_one_json_post_and_succeeds_on_200() {
        let seen: Arc<Mutex<Vec<(Option<String>, String)>>> = Arc::default();
        let recorded = Arc::clone(&seen);
        let app = Router::new().route(
            "/services/T0/B0",
            post(move |headers: HeaderMap, body: String| {
                let recorded = Arc::clone(&recorded);
                async move {
                    let content_type = headers
                        .get("content-type")
                        .map(|v| v.to_str().unwrap().to_string());
                    recorded.lock().unwrap().push((content_type, body));
                    "ok"
                }
            }),
        );
        let base = spawn(app).await;

        let url = WebhookUrl::new(format!("{base}/services/T0/B0")).unwrap();
        SlackNotifier::new().notify(&url, &test_event()).await.unwrap();

        let posts = seen.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let (content_type, body) = &posts[0];
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        let text = value["text"].as_str().unwrap();
        assert!(text.contains("mycontainer/orders/2024-01-01.json"));
        assert!(text.contains("{\"id\":1}"));
    }

    #[tokio::test]
    async fn non_200_status_carries_the_response_body() {
        let app = Router::new().route(
            "/services/T0/B0",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "no_service") }),
        );
        let base = spawn(app).await;

        let url = WebhookUrl::new(format!("{base}/services/T0/B0")).unwrap();
        let err = SlackNotifier::new()
            .notify(&url, &test_event())
            .await
            .unwrap_err();
        match err {
            DeliveryError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "no_service");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_200_counts_as_delivered() {
        let app = Router::new().route(
            "/services/T0/B0",
            post(|| async { StatusCode::NO_CONTENT }),
        );
        let base = spawn(app).await;

        let url = WebhookUrl::new(format!("{base}/services/T0/B0")).unwrap();
        let err = SlackNotifier::new()
            .notify(&url, &test_event())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::UnexpectedStatus { status: 204, .. }
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let url = WebhookUrl::new("http://127.0.0.1:9/services/T0/B0").unwrap();
        let err = SlackNotifier::new()
            .notify(&url, &test_event())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Transport { .. }));
    }
}
