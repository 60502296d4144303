//! Core domain for the blob-relay notification flow.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, cross-cutting error type, and port trait used by the relay.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply
//! it — the Key Vault secret store, the Slack webhook notifier, and the
//! Event Grid event source each live in their own crate.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`BlobName`, `SecretName`, etc.) |
//! | [`types`] | Shared value types (`NotificationEvent`, `WebhookUrl`, `RelayConfig`) |
//! | [`errors`] | Fatal and best-effort error types |
//! | [`handler`] | Port traits and the `RelayHandler` control flow |

pub mod errors;
pub mod handler;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{DeliveryError, RelayError};
pub use handler::{EventHandler, Notifier, RelayHandler, SecretStore};
pub use identifiers::{BlobName, InvocationId, SecretName, VaultName};
pub use types::{NotificationEvent, RelayConfig, Timestamp, WebhookUrl};
