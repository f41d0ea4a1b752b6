//! Short-lived cache of monitor detail data

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::heartbeat::Heartbeat;
use crate::monitor::StatusReading;

/// How long a preloaded entry stays usable
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_epoch_ms(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Preloaded status and heartbeats for one monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub status: StatusReading,
    pub heartbeats: Vec<Heartbeat>,
    pub timestamp_epoch_ms: u64,
}

/// Monitor id keyed store with lazy expiry.
///
/// Stale entries are kept but never handed out; the next `store` for the
/// same monitor overwrites them.
#[derive(Debug)]
pub struct PreloadCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Default for PreloadCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl PreloadCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl: CACHE_TTL,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Store a snapshot stamped with the current clock time
    pub async fn store(&self, monitor_id: u64, status: StatusReading, heartbeats: Vec<Heartbeat>) {
        let entry = CacheEntry {
            status,
            heartbeats,
            timestamp_epoch_ms: self.clock.now_epoch_ms(),
        };
        self.insert(monitor_id, entry).await;
    }

    /// Store a snapshot as-is, keeping its timestamp
    pub async fn insert(&self, monitor_id: u64, entry: CacheEntry) {
        self.entries.write().await.insert(monitor_id, entry);
    }

    /// The entry for `monitor_id` if it is younger than the TTL
    pub async fn get(&self, monitor_id: u64) -> Option<CacheEntry> {
        let now = self.clock.now_epoch_ms();
        let entries = self.entries.read().await;
        let entry = entries.get(&monitor_id)?;
        let age_ms = now.saturating_sub(entry.timestamp_epoch_ms);
        if u128::from(age_ms) < self.ttl.as_millis() {
            tracing::debug!("Using cached data for monitor {}", monitor_id);
            Some(entry.clone())
        } else {
            tracing::debug!(
                "Cached data for monitor {} expired ({} ms old)",
                monitor_id,
                age_ms
            );
            None
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
