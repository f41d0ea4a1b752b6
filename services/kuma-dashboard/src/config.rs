//! Settings persistence and connection configuration

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Keys used in the settings store
pub mod keys {
    pub const SERVER_URL: &str = "kuma_server_url";
    pub const STATUS_PAGE_ID: &str = "kuma_status_page_id";
    pub const AUTO_REFRESH: &str = "kuma_auto_refresh";
    pub const REFRESH_INTERVAL: &str = "kuma_refresh_interval";

    pub const ALL: [&str; 4] = [SERVER_URL, STATUS_PAGE_ID, AUTO_REFRESH, REFRESH_INTERVAL];
}

pub const DEFAULT_STATUS_PAGE_ID: &str = "vroom";
pub const DEFAULT_REFRESH_INTERVAL: &str = "30";
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);
/// Longest auto-refresh period; larger stored values are clamped to it
pub const MAX_REFRESH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// String key-value store holding the user's settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> crate::Result<()>;
}

/// In-memory store, used by tests and one-off CLI invocations
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> crate::Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                crate::KumaError::Storage(format!(
                    "Failed to parse settings file {:?}: {}",
                    self.path, e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(crate::KumaError::Storage(format!(
                "Failed to read settings file {:?}: {}",
                self.path, e
            ))),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        let _guard = self.lock.write().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(&values)?;
        tokio::fs::write(&self.path, content).await?;
        tracing::debug!("Stored setting '{}' in {:?}", key, self.path);
        Ok(())
    }
}

/// User settings as stored on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub status_page_id: String,
    pub auto_refresh: bool,
    pub refresh_interval: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            status_page_id: DEFAULT_STATUS_PAGE_ID.to_string(),
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL.to_string(),
        }
    }
}

impl Settings {
    /// Read all settings, falling back to defaults for missing keys
    pub async fn load(store: &dyn SettingsStore) -> crate::Result<Self> {
        let defaults = Settings::default();
        let server_url = store.get(keys::SERVER_URL).await?.unwrap_or_default();
        let status_page_id = store
            .get(keys::STATUS_PAGE_ID)
            .await?
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.status_page_id);
        let auto_refresh = store
            .get(keys::AUTO_REFRESH)
            .await?
            .map(|v| v == "true")
            .unwrap_or(defaults.auto_refresh);
        let refresh_interval = store
            .get(keys::REFRESH_INTERVAL)
            .await?
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.refresh_interval);

        Ok(Self {
            server_url,
            status_page_id,
            auto_refresh,
            refresh_interval,
        })
    }

    /// Write all four keys back to the store
    pub async fn save(&self, store: &dyn SettingsStore) -> crate::Result<()> {
        store.set(keys::SERVER_URL, &self.server_url).await?;
        store.set(keys::STATUS_PAGE_ID, &self.status_page_id).await?;
        store
            .set(keys::AUTO_REFRESH, &self.auto_refresh.to_string())
            .await?;
        store
            .set(keys::REFRESH_INTERVAL, &self.refresh_interval)
            .await?;
        Ok(())
    }

    /// Update one setting by its store key
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::Result<()> {
        match key {
            keys::SERVER_URL => self.server_url = value.trim().to_string(),
            keys::STATUS_PAGE_ID => self.status_page_id = value.trim().to_string(),
            keys::AUTO_REFRESH => {
                self.auto_refresh = value.parse::<bool>().map_err(|_| {
                    crate::KumaError::Config(format!(
                        "{} must be 'true' or 'false', got '{}'",
                        key, value
                    ))
                })?
            }
            keys::REFRESH_INTERVAL => {
                let max = MAX_REFRESH_PERIOD.as_secs();
                match value.trim().parse::<u64>() {
                    Ok(secs) if (1..=max).contains(&secs) => {
                        self.refresh_interval = value.trim().to_string();
                    }
                    _ => {
                        return Err(crate::KumaError::Config(format!(
                            "{} must be between 1 and {} seconds, got '{}'",
                            key, max, value
                        )))
                    }
                }
            }
            other => {
                return Err(crate::KumaError::Config(format!(
                    "Unknown setting '{}'",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Auto-refresh period from the stored interval. Unparseable or zero
    /// values fall back to 30 seconds; anything above a day is capped.
    pub fn refresh_period(&self) -> Duration {
        match self.refresh_interval.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs).min(MAX_REFRESH_PERIOD),
            _ => {
                tracing::debug!(
                    "Invalid refresh interval '{}', using {:?}",
                    self.refresh_interval,
                    DEFAULT_REFRESH_PERIOD
                );
                DEFAULT_REFRESH_PERIOD
            }
        }
    }
}

/// Server URL and status page the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub server_url: String,
    pub status_page_id: String,
}

impl ConnectionConfig {
    /// Validate a URL/page id pair. Both must be non-empty; a trailing `/` on
    /// the URL is dropped.
    pub fn new(server_url: &str, status_page_id: &str) -> crate::Result<Self> {
        let server_url = server_url.trim().trim_end_matches('/');
        let status_page_id = status_page_id.trim();
        if server_url.is_empty() || status_page_id.is_empty() {
            return Err(crate::KumaError::Config(
                "Please configure your server URL and status page ID in settings".to_string(),
            ));
        }
        Ok(Self {
            server_url: server_url.to_string(),
            status_page_id: status_page_id.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> crate::Result<Self> {
        Self::new(&settings.server_url, &settings.status_page_id)
    }
}
