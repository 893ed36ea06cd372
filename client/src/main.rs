use std::sync::Arc;
use std::time::Duration;

use reading_map_client::api::ApiClient;
use reading_map_client::config::{self, SPRITE_SIZE, SyncConfig};
use reading_map_client::controller::{
    ControllerInputs, MapEvent, MapSyncController, readings_fetch,
};
use reading_map_client::fetch::{ResilientFetchClient, RetryPolicy};
use reading_map_client::image_loader::{BoundedImageLoader, ProxiedImageSource};
use reading_map_client::poller::{PollUpdate, Poller};
use reading_map_client::renderer::LogRenderer;
use reading_map_client::stale_guard::StaleGuardedCoordinator;
use reading_map_shared::{MONTHS, legend};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

const USER_AGENT: &str = concat!("reading-map-sync/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = SyncConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        proxy_url = %config.proxy_url,
        api_key = config.api_key.is_some(),
        "starting reading map sync"
    );
    for entry in legend(&MONTHS) {
        tracing::debug!(
            month = %entry.name,
            swatch = %entry.swatch,
            countries = %entry.count_label(),
            "legend"
        );
    }

    let http = match reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(config::DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return;
        }
    };
    let fetch = Arc::new(ResilientFetchClient::new(
        Arc::new(http),
        config.api_key.clone(),
        RetryPolicy::from(&config),
    ));
    let api = Arc::new(ApiClient::new(fetch, &config.api_url, &config.proxy_url));

    let (loader, sprites) = BoundedImageLoader::new(
        Arc::new(ProxiedImageSource::new(Arc::clone(&api))),
        config.image_concurrency,
        SPRITE_SIZE,
    );
    let (readings_guard, readings) =
        StaleGuardedCoordinator::new(readings_fetch(Arc::clone(&api)));
    let controller = MapSyncController::new(
        LogRenderer::default(),
        loader,
        readings_guard,
        MONTHS.clone(),
        config.ring_layout,
        SPRITE_SIZE,
    );

    // Headless: always focused. A host embedding the engine drives this.
    let (_focus_tx, focus_rx) = watch::channel(true);
    let (update_tx, updates) = mpsc::channel(16);

    let stats_poller = Arc::new(Poller::stats(
        Arc::clone(&api),
        config.stats_poll_interval,
        config.dedupe_window,
    ));
    let users_poller = Arc::new(Poller::users(
        Arc::clone(&api),
        config.users_poll_interval,
        config.dedupe_window,
    ));
    let stats_focus = config.pause_stats_when_unfocused.then_some(focus_rx);
    tokio::spawn(stats_poller.run(update_tx.clone(), stats_focus, PollUpdate::Stats));
    tokio::spawn(users_poller.run(update_tx, None, PollUpdate::Users));

    let (event_tx, events) = mpsc::channel(64);
    let sync = tokio::spawn(controller.run(ControllerInputs {
        events,
        updates,
        sprites,
        readings,
    }));
    if event_tx.send(MapEvent::StyleLoaded).await.is_err() {
        tracing::error!("map sync exited before the style loaded");
        return;
    }

    shutdown_signal().await;
    drop(event_tx);
    match sync.await {
        Ok(controller) => tracing::info!(
            sprites = controller.renderer().sprite_count(),
            paint_updates = controller.renderer().paint_updates(),
            "map sync finished"
        ),
        Err(e) => tracing::error!(error = %e, "map sync task failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
