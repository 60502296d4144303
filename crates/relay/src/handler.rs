//! Port traits and the handler control flow.
//!
//! The flow is three external calls in a straight line, once per triggering
//! event: receive (done by the event source before this crate is involved),
//! resolve the webhook URL, notify. No state machine, no branching beyond the
//! final delivery-status check.
//!
//! Infrastructure is injected through the [`SecretStore`] and [`Notifier`]
//! traits, so tests drive the full flow with in-process fakes and no network.

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::errors::{DeliveryError, RelayError};
use crate::identifiers::SecretName;
use crate::types::{NotificationEvent, RelayConfig, WebhookUrl};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Resolves a named secret to its current value.
///
/// Every call is a fresh round-trip to the store; implementations must not
/// cache. The only production implementation is the Key Vault adapter.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the current value of the named secret.
    async fn get_secret(&self, name: &SecretName) -> Result<String, RelayError>;
}

/// Delivers one notification to a webhook endpoint.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Issues exactly one HTTP POST for the given event.
    ///
    /// `Ok(())` means the endpoint answered 200; anything else (non-200
    /// status, transport failure) is a [`DeliveryError`].
    async fn notify(&self, url: &WebhookUrl, event: &NotificationEvent)
        -> Result<(), DeliveryError>;
}

/// One invocation of the relay for one triggering event.
///
/// Event sources (the Event Grid receiver, the single-shot CLI path) depend
/// on this trait only; they never see the concrete handler type.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes a single event to completion.
    async fn handle(&self, event: NotificationEvent) -> Result<(), RelayError>;
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// The relay control flow: echo the event, resolve the webhook URL, notify.
///
/// Resolution failures are fatal and propagate to the event source; delivery
/// failures are logged and swallowed. That asymmetry is deliberate — the
/// notification is best-effort, while a broken credential chain or missing
/// secret is an operator problem that must fail loudly.
pub struct RelayHandler<S, N> {
    config: RelayConfig,
    secrets: S,
    notifier: N,
}

impl<S, N> RelayHandler<S, N>
where
    S: SecretStore,
    N: Notifier,
{
    /// Creates a handler with the given configuration and injected clients.
    pub fn new(config: RelayConfig, secrets: S, notifier: N) -> Self {
        Self {
            config,
            secrets,
            notifier,
        }
    }
}

#[async_trait]
impl<S, N> EventHandler for RelayHandler<S, N>
where
    S: SecretStore,
    N: Notifier,
{
    #[instrument(
        name = "relay.handle",
        skip_all,
        fields(invocation = %event.invocation, blob = %event.name)
    )]
    async fn handle(&self, event: NotificationEvent) -> Result<(), RelayError> {
        info!(
            name = %event.name,
            content = %event.content,
            "processing storage event"
        );

        let value = self.secrets.get_secret(&self.config.secret_name).await?;
        let url = WebhookUrl::new(value).ok_or_else(|| RelayError::SecretStore {
            message: format!(
                "secret '{}' resolved to an empty value",
                self.config.secret_name
            ),
        })?;

        match self.notifier.notify(&url, &event).await {
            Ok(()) => info!("notification delivered to webhook"),
            Err(err) => error!(error = %err, "failed to deliver notification to webhook"),
        }

        Ok(())
    }
}
