//! Process-wide configuration.
//!
//! All environment values are read exactly once at startup into [`AppConfig`]
//! and handed to the components that need them; nothing else in the workspace
//! touches the environment. A missing or invalid value fails startup with
//! [`RelayError::Configuration`] — the relay never runs half-configured.

use std::net::SocketAddr;

use relay::{RelayConfig, RelayError, SecretName, VaultName};

/// Environment value naming the Key Vault instance (host prefix).
const KEY_VAULT_NAME: &str = "KEY_VAULT_NAME";

/// Environment value naming the secret that holds the webhook URL.
const WEBHOOK_SECRET_NAME: &str = "WEBHOOK_SECRET_NAME";

/// Environment value for the Event Grid receiver's bind address (optional).
const RELAY_LISTEN_ADDR: &str = "RELAY_LISTEN_ADDR";

/// Default bind address when `RELAY_LISTEN_ADDR` is unset.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Startup configuration for the whole process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The vault holding the webhook secret.
    pub vault: VaultName,
    /// The name of the webhook secret within that vault.
    pub secret_name: SecretName,
    /// Bind address for the Event Grid receiver (`serve` mode only).
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary lookup, so tests never mutate
    /// the real environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayError> {
        let vault = lookup(KEY_VAULT_NAME)
            .and_then(VaultName::new)
            .ok_or_else(|| missing(KEY_VAULT_NAME))?;

        let secret_name = lookup(WEBHOOK_SECRET_NAME)
            .and_then(SecretName::new)
            .ok_or_else(|| missing(WEBHOOK_SECRET_NAME))?;

        let raw_addr = lookup(RELAY_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into());
        let listen_addr = raw_addr
            .parse()
            .map_err(|err| RelayError::Configuration {
                message: format!("{RELAY_LISTEN_ADDR} is not a valid socket address: {err}"),
            })?;

        Ok(Self {
            vault,
            secret_name,
            listen_addr,
        })
    }

    /// The slice of configuration the handler itself receives.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            secret_name: self.secret_name.clone(),
        }
    }
}

fn missing(key: &str) -> RelayError {
    RelayError::Configuration {
        message: format!("{key} is not set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn loads_a_complete_configuration() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("KEY_VAULT_NAME", "myvault"),
            ("WEBHOOK_SECRET_NAME", "slack-webhook-url"),
            ("RELAY_LISTEN_ADDR", "127.0.0.1:9999"),
        ]))
        .unwrap();

        assert_eq!(config.vault.as_str(), "myvault");
        assert_eq!(config.secret_name.as_str(), "slack-webhook-url");
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:9999");
        assert_eq!(
            config.relay_config().secret_name.as_str(),
            "slack-webhook-url"
        );
    }

    #[test]
    fn listen_addr_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("KEY_VAULT_NAME", "myvault"),
            ("WEBHOOK_SECRET_NAME", "slack-webhook-url"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn missing_vault_name_fails_startup() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "WEBHOOK_SECRET_NAME",
            "slack-webhook-url",
        )]))
        .unwrap_err();
        match err {
            RelayError::Configuration { message } => assert!(message.contains("KEY_VAULT_NAME")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn empty_secret_name_fails_startup() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("KEY_VAULT_NAME", "myvault"),
            ("WEBHOOK_SECRET_NAME", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::Configuration { .. }));
    }

    #[test]
    fn malformed_listen_addr_fails_startup() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("KEY_VAULT_NAME", "myvault"),
            ("WEBHOOK_SECRET_NAME", "slack-webhook-url"),
            ("RELAY_LISTEN_ADDR", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::Configuration { .. }));
    }
}
