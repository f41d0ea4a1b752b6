//! Data-access object tying configuration, fetchers and the preload cache

use std::sync::Arc;

use serde::Serialize;

use crate::badge::get_monitor_status;
use crate::cache::{CacheEntry, PreloadCache};
use crate::config::{ConnectionConfig, Settings};
use crate::heartbeat::{get_heartbeats, Heartbeat};
use crate::io::HttpClient;
use crate::monitor::{OverallStatus, StatusPageData, StatusReading};
use crate::stats::HeartbeatStats;
use crate::status_page::{self, ConnectionCheck};

/// Everything the detail view needs for one monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorDetail {
    pub monitor_id: u64,
    pub status: StatusReading,
    pub heartbeats: Vec<Heartbeat>,
    pub stats: HeartbeatStats,
    pub from_cache: bool,
}

/// Client for one Uptime Kuma status page.
///
/// Owns the preload cache; nothing is shared between instances.
pub struct KumaClient {
    server_url: String,
    status_page_id: String,
    http: Arc<dyn HttpClient>,
    cache: PreloadCache,
}

impl std::fmt::Debug for KumaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KumaClient")
            .field("server_url", &self.server_url)
            .field("status_page_id", &self.status_page_id)
            .finish()
    }
}

impl KumaClient {
    pub fn new(
        server_url: &str,
        status_page_id: &str,
        http: Arc<dyn HttpClient>,
        cache: PreloadCache,
    ) -> Self {
        Self {
            server_url: server_url.trim().trim_end_matches('/').to_string(),
            status_page_id: status_page_id.trim().to_string(),
            http,
            cache,
        }
    }

    pub fn from_settings(settings: &Settings, http: Arc<dyn HttpClient>) -> Self {
        Self::new(
            &settings.server_url,
            &settings.status_page_id,
            http,
            PreloadCache::default(),
        )
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn status_page_id(&self) -> &str {
        &self.status_page_id
    }

    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    /// Validated connection settings, or `KumaError::Config`
    pub fn connection(&self) -> crate::Result<ConnectionConfig> {
        ConnectionConfig::new(&self.server_url, &self.status_page_id)
    }

    pub async fn fetch_status_page(&self) -> crate::Result<StatusPageData> {
        let conn = self.connection()?;
        status_page::fetch_status_page(self.http.as_ref(), &conn.server_url, &conn.status_page_id)
            .await
    }

    pub async fn fetch_overall_status(&self) -> OverallStatus {
        match self.connection() {
            Ok(conn) => {
                status_page::fetch_overall_status(
                    self.http.as_ref(),
                    &conn.server_url,
                    &conn.status_page_id,
                )
                .await
            }
            Err(e) => {
                tracing::debug!("Skipping overall status: {}", e);
                crate::monitor::Status::Up
            }
        }
    }

    pub async fn get_monitor_status(&self, monitor_id: u64) -> StatusReading {
        get_monitor_status(self.http.as_ref(), &self.server_url, monitor_id).await
    }

    /// Empty when the server URL or status page id is missing
    pub async fn get_heartbeats(&self, monitor_id: u64) -> Vec<Heartbeat> {
        let conn = match self.connection() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!("Skipping heartbeats for monitor {}: {}", monitor_id, e);
                return Vec::new();
            }
        };
        get_heartbeats(
            self.http.as_ref(),
            &conn.server_url,
            &conn.status_page_id,
            monitor_id,
        )
        .await
    }

    pub async fn test_connection(&self) -> crate::Result<ConnectionCheck> {
        status_page::test_connection(self.http.as_ref(), &self.server_url, &self.status_page_id)
            .await
    }

    /// Fetch status and heartbeats together and cache them.
    ///
    /// Best effort: problems are logged and nothing is returned.
    pub async fn preload(&self, monitor_id: u64) {
        if let Err(e) = self.connection() {
            tracing::warn!("Failed to preload data for monitor {}: {}", monitor_id, e);
            return;
        }

        tracing::debug!("Preloading data for monitor {}", monitor_id);
        let (status, heartbeats) = tokio::join!(
            self.get_monitor_status(monitor_id),
            self.get_heartbeats(monitor_id)
        );
        let count = heartbeats.len();
        self.cache.store(monitor_id, status, heartbeats).await;
        tracing::debug!(
            "Cached data for monitor {} ({} heartbeats)",
            monitor_id,
            count
        );
    }

    /// Preloaded data for the monitor, if still fresh
    pub async fn get_cached(&self, monitor_id: u64) -> Option<CacheEntry> {
        self.cache.get(monitor_id).await
    }

    /// Cached detail when fresh, otherwise live status then heartbeats
    pub async fn load_detail(&self, monitor_id: u64) -> MonitorDetail {
        if let Some(entry) = self.get_cached(monitor_id).await {
            return MonitorDetail {
                monitor_id,
                stats: HeartbeatStats::from_heartbeats(&entry.heartbeats),
                status: entry.status,
                heartbeats: entry.heartbeats,
                from_cache: true,
            };
        }

        let status = self.get_monitor_status(monitor_id).await;
        let heartbeats = self.get_heartbeats(monitor_id).await;
        MonitorDetail {
            monitor_id,
            stats: HeartbeatStats::from_heartbeats(&heartbeats),
            status,
            heartbeats,
            from_cache: false,
        }
    }
}
