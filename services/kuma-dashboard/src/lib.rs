//! Kuma Dashboard - status-page client for Uptime Kuma
//!
//! Polls a Kuma status page, normalizes JSON and SVG badge answers into one
//! status model, and keeps a short-lived cache for monitor detail views.

pub mod badge;
pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod heartbeat;
pub mod io;
pub mod monitor;
pub mod state;
pub mod stats;
pub mod status_page;
pub mod svg;

pub use client::{KumaClient, MonitorDetail};
pub use config::{ConnectionConfig, JsonFileStore, MemoryStore, Settings, SettingsStore};
pub use engine::{Engine, RefreshTrigger};
pub use error::{KumaError, Result};
pub use monitor::{Monitor, MonitorWithStatus, OverallStatus, Status, StatusReading};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;

/// Build a client for the configured server with the production HTTP stack
pub fn build_client(settings: &Settings, timeout: Duration) -> Arc<KumaClient> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(timeout));
    Arc::new(KumaClient::from_settings(settings, http))
}

/// Run the refresh engine until Ctrl-C.
///
/// Returns the engine's state handle immediately after spawning so callers
/// can render it; the returned sender forwards focus/manual/retry triggers.
pub fn spawn_engine(
    client: Arc<KumaClient>,
    settings: &Settings,
    cancel: CancellationToken,
) -> (state::StateHandle, mpsc::Sender<RefreshTrigger>) {
    let state = state::new_state_handle();
    let (tx, rx) = mpsc::channel(8);
    let engine = Engine::new(client, settings, Arc::clone(&state), cancel.clone());

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                cancel_for_signal.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    tokio::spawn(async move {
        tracing::info!("Kuma refresh engine started");
        engine.run(rx).await;
        tracing::info!("Kuma refresh engine stopped");
    });

    (state, tx)
}
