//! `subtitler-sync`: headless client for the subtitle service.
//!
//! Lists projects, then polls processing projects until transcription has
//! finished for all of them or the process is interrupted.

use std::sync::Arc;

use anyhow::Context;
use subtitler_client::{ApiClient, ClientConfig, SubtitleApi};
use subtitler_store::config::SyncConfig;
use subtitler_store::watch::watch_processing;
use subtitler_store::{FileStorage, SettingsStore, SubtitleStore, ThemeStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subtitler_store=info,subtitler_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let client_config = ClientConfig::from_env().context("invalid client configuration")?;
    let sync_config = SyncConfig::from_env().context("invalid sync configuration")?;
    tracing::info!(
        base_url = %client_config.base_url,
        poll_interval_secs = sync_config.poll_interval.as_secs(),
        refetch_policy = %sync_config.store.refetch_policy,
        merge_policy = %sync_config.store.merge_policy,
        "Loaded configuration",
    );

    // --- Local state ---
    let storage = Arc::new(FileStorage::new(&sync_config.state_dir));
    let settings = SettingsStore::new(Arc::clone(&storage));
    let themes = ThemeStore::new(storage);
    tracing::info!(
        state_dir = %sync_config.state_dir.display(),
        language = %settings.settings().language,
        theme = themes.current_theme_id(),
        "Loaded local settings",
    );

    // --- Store ---
    let cancel = CancellationToken::new();
    let client = ApiClient::new(&client_config)
        .context("failed to build HTTP client")?
        .with_cancellation(cancel.child_token());
    let store = Arc::new(SubtitleStore::new(
        Arc::new(SubtitleApi::new(client)),
        sync_config.store,
    ));

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    // --- Sync ---
    let listed = store
        .fetch_projects()
        .await
        .context("failed to list projects")?;
    let processing = store.processing_projects().await.len();
    tracing::info!(
        projects = listed.value.len(),
        processing,
        completed = store.completed_projects().await.len(),
        "Projects loaded",
    );

    let summary = watch_processing(&store, sync_config.poll_interval, &cancel).await;
    tracing::info!(
        rounds = summary.rounds,
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        vanished = summary.vanished.len(),
        cancelled = summary.cancelled,
        "Status watch finished",
    );

    store.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), stopping");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, stopping");
        }
    }
}
