//! Engine: drives refresh cycles and publishes results into shared state

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::KumaClient;
use crate::config::Settings;
use crate::monitor::{Status, StatusReading};
use crate::state::{Generation, StateHandle};
use crate::KumaError;

/// Why a refresh was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    Interval,
    Focus,
    Manual,
    Retry,
}

/// A refresh whose roster and aggregate are published. Its per-monitor
/// fetches keep running on their own; dropping the cycle detaches them.
#[derive(Debug)]
pub struct RefreshCycle {
    pub generation: Generation,
    monitor_tasks: Vec<JoinHandle<()>>,
}

impl RefreshCycle {
    /// Wait until every monitor of this cycle has been patched
    pub async fn settled(self) -> Generation {
        for task in self.monitor_tasks {
            if let Err(e) = task.await {
                tracing::debug!("Monitor task of refresh {} ended early: {}", self.generation, e);
            }
        }
        self.generation
    }
}

/// Refreshes the dashboard state from the server
pub struct Engine {
    client: Arc<KumaClient>,
    state: StateHandle,
    refresh_period: Option<Duration>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        client: Arc<KumaClient>,
        settings: &Settings,
        state: StateHandle,
        cancel: CancellationToken,
    ) -> Self {
        let refresh_period = settings.auto_refresh.then(|| settings.refresh_period());
        Self {
            client,
            state,
            refresh_period,
            cancel,
        }
    }

    pub fn client(&self) -> &Arc<KumaClient> {
        &self.client
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Timer period, `None` when auto-refresh is off
    pub fn refresh_period(&self) -> Option<Duration> {
        self.refresh_period
    }

    /// Run one refresh cycle.
    ///
    /// The roster is published as soon as it arrives; each monitor is then
    /// patched by its own task as its badge resolves. Returns once the roster
    /// and the aggregate status are in, without waiting for the monitors, so
    /// a hung badge request only keeps its own monitor `Loading`.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshCycle {
        let generation = self.state.write().await.begin_refresh();
        tracing::debug!("Refresh {} started ({:?})", generation, trigger);

        let page = match self.client.fetch_status_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error refreshing data: {}", e);
                let overall = match e {
                    KumaError::Config(_) => None,
                    _ => Some(Status::Error),
                };
                self.state
                    .write()
                    .await
                    .fail(generation, e.user_message(), overall);
                return RefreshCycle {
                    generation,
                    monitor_tasks: Vec::new(),
                };
            }
        };

        let roster = page.roster();
        let monitor_ids: Vec<u64> = roster.iter().map(|m| m.id()).collect();
        let now_ms = self.client.cache().clock().now_epoch_ms();
        self.state
            .write()
            .await
            .publish_roster(generation, roster, now_ms);
        tracing::debug!(
            "Refresh {} published {} monitors",
            generation,
            monitor_ids.len()
        );

        let monitor_tasks = monitor_ids
            .into_iter()
            .map(|monitor_id| {
                tokio::spawn(patch_monitor(
                    Arc::clone(&self.client),
                    Arc::clone(&self.state),
                    generation,
                    monitor_id,
                ))
            })
            .collect();

        let overall = self.client.fetch_overall_status().await;
        {
            let mut state = self.state.write().await;
            state.set_overall_status(generation, overall);
            state.finish(generation);
        }

        tracing::debug!("Refresh {} published overall status {}", generation, overall);
        RefreshCycle {
            generation,
            monitor_tasks,
        }
    }

    /// Refresh on start, on every timer tick and on every external trigger,
    /// until cancelled.
    pub async fn run(&self, mut triggers: mpsc::Receiver<RefreshTrigger>) {
        self.refresh(RefreshTrigger::Initial).await;

        let mut ticker = match (self.refresh_period, self.client.connection()) {
            (Some(period), Ok(_)) => {
                tracing::info!("Auto-refresh every {:?}", period);
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(interval)
            }
            _ => None,
        };
        let mut triggers_open = true;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Refresh loop cancelled");
                    break;
                }
                _ = next_tick(&mut ticker) => {
                    self.refresh(RefreshTrigger::Interval).await;
                }
                trigger = triggers.recv(), if triggers_open => match trigger {
                    Some(trigger) => {
                        self.refresh(trigger).await;
                    }
                    None => {
                        tracing::debug!("Refresh trigger channel closed");
                        triggers_open = false;
                    }
                },
            }
        }
    }
}

/// Fetch one monitor's status and patch it into the state. A panic in the
/// fetch reads as `Error` for that monitor.
async fn patch_monitor(
    client: Arc<KumaClient>,
    state: StateHandle,
    generation: Generation,
    monitor_id: u64,
) {
    let fetch = tokio::spawn(async move { client.get_monitor_status(monitor_id).await });
    let reading = match fetch.await {
        Ok(reading) => reading,
        Err(e) => {
            tracing::warn!("Failed to fetch status for monitor {}: {}", monitor_id, e);
            StatusReading::error()
        }
    };
    state
        .write()
        .await
        .patch_monitor(generation, monitor_id, reading);
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
