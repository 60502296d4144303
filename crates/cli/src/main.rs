//! Blob-relay entry point.
//!
//! This binary is the composition root for the whole system. Responsibilities:
//!
//! 1. **Parse configuration** — read `KEY_VAULT_NAME`, `WEBHOOK_SECRET_NAME`,
//!    and the optional bind address from the environment, once, at startup.
//! 2. **Wire observability** — configure `tracing-subscriber` with an env
//!    filter. Log lines go to stdout; the hosting platform's log sink
//!    collects them from there.
//! 3. **Construct infrastructure** — managed-identity credential chain,
//!    Key Vault secret store, Slack notifier — and inject them into the
//!    `RelayHandler`.
//! 4. **Select trigger mode**:
//!    - `serve` — bind the Event Grid receiver and run until stopped.
//!    - `send` — synthesise one event from a local file and process it once,
//!      useful before a storage subscription exists.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use identity::ManagedIdentityCredential;
use keyvault::KeyVaultSecretStore;
use listener::{BlobDownloader, EventGridReceiver};
use relay::{BlobName, EventHandler, NotificationEvent, RelayHandler};
use slack::SlackNotifier;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "blob-relay", about = "Relays storage-change events to a webhook.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the Event Grid receiver until stopped.
    Serve,
    /// Process a single synthetic event from a local file.
    Send {
        /// Object name to report, in `container/path` form.
        #[arg(long)]
        name: String,
        /// File whose bytes stand in for the triggering object's content.
        #[arg(long)]
        file: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    let credential = Arc::new(ManagedIdentityCredential::new());
    let secrets = KeyVaultSecretStore::new(&config.vault, credential.clone());
    let notifier = SlackNotifier::new();
    let handler = Arc::new(RelayHandler::new(config.relay_config(), secrets, notifier));

    match cli.command {
        Command::Serve => {
            info!(vault = %config.vault, "starting in serve mode");
            let listener = tokio::net::TcpListener::bind(config.listen_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.listen_addr))?;
            EventGridReceiver::new(handler, BlobDownloader::new(credential))
                .serve(listener)
                .await
                .context("event grid receiver failed")?;
        }
        Command::Send { name, file } => {
            let name = BlobName::new(name).context("--name must not be empty")?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let event = NotificationEvent::from_bytes(name, bytes)?;
            handler.handle(event).await?;
        }
    }

    Ok(())
}
