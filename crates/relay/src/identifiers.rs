//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging — for example —
//! a [`VaultName`] with a [`SecretName`] even though both are `String` under the
//! hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (platform-assigned / configuration names)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies the triggering storage object in `container/path` form
    /// (e.g. `"mycontainer/orders/2024-01-01.json"`).
    ///
    /// Assigned by the storage platform; opaque to the relay — it is echoed
    /// in logs and embedded in the notification text, never parsed.
    BlobName
}

string_id! {
    /// The Key Vault host prefix, i.e. the `{vault}` in
    /// `https://{vault}.vault.azure.net/`.
    ///
    /// Sourced from the `KEY_VAULT_NAME` environment value at startup.
    VaultName
}

string_id! {
    /// The name under which the webhook URL is stored in the secret store.
    ///
    /// Sourced from the `WEBHOOK_SECRET_NAME` environment value at startup.
    SecretName
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single handler invocation (one triggering event).
///
/// Generated fresh when the event is received; propagated through spans so
/// all log lines from one invocation can be correlated even when the listener
/// serves concurrent events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an [`InvocationId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_identifiers_reject_empty_values() {
        assert!(BlobName::new("").is_none());
        assert!(VaultName::new("").is_none());
        assert!(SecretName::new("").is_none());
    }

    #[test]
    fn blob_name_preserves_path_separators() {
        let name = BlobName::new("mycontainer/orders/2024-01-01.json").unwrap();
        assert_eq!(name.as_str(), "mycontainer/orders/2024-01-01.json");
        assert_eq!(name.to_string(), "mycontainer/orders/2024-01-01.json");
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
