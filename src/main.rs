use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing_subscriber::EnvFilter;

use ezzifly::api::Api;
use ezzifly::cli::Repl;
use ezzifly::config::ClientConfig;
use ezzifly::session::SessionStore;
use ezzifly::storage::{FileStore, KeyValueStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Invalid configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&config);

    eprintln!("✈️  Ezzifly v{}", env!("CARGO_PKG_VERSION"));
    match &config.api_base_url {
        Some(url) => eprintln!("   API: {url}"),
        None => eprintln!("   API: not configured (set EZZIFLY_API_URL)"),
    }
    eprintln!(
        "   Demo fallback: {} (demo accounts end in {})",
        if config.demo_fallback { "on" } else { "off" },
        config.demo_domain
    );
    eprintln!("   Storage: {}", config.storage_path.display());

    let storage: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.storage_path)
            .await
            .with_context(|| format!("Failed to open {}", config.storage_path.display()))?,
    );

    let api = Api::from_config(&config).context("Failed to build HTTP client")?;
    let session = Arc::new(SessionStore::load(storage.clone(), api.auth.clone()).await);

    // Log every sign-in state change
    let watcher = {
        let session = session.clone();
        let mut changes = BroadcastStream::new(session.subscribe());
        tokio::spawn(async move {
            while let Some(change) = changes.next().await {
                if change.is_err() {
                    continue;
                }
                match session.user().await {
                    Some(user) => tracing::info!(user_id = %user.id, "Signed in"),
                    None => tracing::info!("Signed out"),
                }
            }
        })
    };

    Repl::new(api, session, storage).run().await?;

    watcher.abort();
    eprintln!("Goodbye.");
    Ok(())
}

/// Log to stderr, or to a daily rolling file when a log directory is set.
fn init_tracing(config: &ClientConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ezzifly.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
