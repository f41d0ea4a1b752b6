//! Published dashboard state shared between the engine and its consumers

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::monitor::{MonitorWithStatus, OverallStatus, Status, StatusReading};

/// Refresh cycle tag. Writes carrying an older generation are dropped.
pub type Generation = u64;

/// Headline counts for the home screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub errors: usize,
    pub headline: &'static str,
}

/// What the UI renders
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub monitors: Vec<MonitorWithStatus>,
    pub overall_status: OverallStatus,
    pub loading: bool,
    pub error: Option<String>,
    /// The monitor list comes from an earlier refresh that has since failed
    pub stale: bool,
    pub last_updated_epoch_ms: Option<u64>,
    pub generation: Generation,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            monitors: Vec::new(),
            overall_status: Status::Loading,
            loading: true,
            error: None,
            stale: false,
            last_updated_epoch_ms: None,
            generation: 0,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_current(&self, generation: Generation) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping update from refresh {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    /// Start a new refresh cycle and return its generation
    pub fn begin_refresh(&mut self) -> Generation {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Replace the roster. Entries arrive in `Loading`.
    pub fn publish_roster(
        &mut self,
        generation: Generation,
        monitors: Vec<MonitorWithStatus>,
        now_ms: u64,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.monitors = monitors;
        self.stale = false;
        self.last_updated_epoch_ms = Some(now_ms);
        true
    }

    /// Patch a single monitor with a fresh reading
    pub fn patch_monitor(
        &mut self,
        generation: Generation,
        monitor_id: u64,
        reading: StatusReading,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        match self.monitors.iter_mut().find(|m| m.id() == monitor_id) {
            Some(monitor) => {
                monitor.status = reading.status;
                monitor.last_check = reading.last_check;
                true
            }
            None => false,
        }
    }

    pub fn set_overall_status(&mut self, generation: Generation, status: OverallStatus) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.overall_status = status;
        true
    }

    /// Record a page-level failure. The previous roster stays visible but is
    /// flagged stale when there is one.
    pub fn fail(&mut self, generation: Generation, message: String, overall: Option<OverallStatus>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.error = Some(message);
        if let Some(status) = overall {
            self.overall_status = status;
        }
        self.stale = !self.monitors.is_empty();
        self.loading = false;
        true
    }

    pub fn finish(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn monitor(&self, monitor_id: u64) -> Option<&MonitorWithStatus> {
        self.monitors.iter().find(|m| m.id() == monitor_id)
    }

    pub fn summary(&self) -> DashboardSummary {
        let count = |status: Status| self.monitors.iter().filter(|m| m.status == status).count();
        DashboardSummary {
            total: self.monitors.len(),
            up: count(Status::Up),
            down: count(Status::Down),
            errors: count(Status::Error),
            headline: headline(self.overall_status),
        }
    }
}

/// Banner text for an overall status
pub fn headline(status: OverallStatus) -> &'static str {
    match status {
        Status::Up => "All Systems Operational",
        Status::Down => "Service Disruption",
        Status::Error => "Connection Error",
        Status::Loading => "Loading...",
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<DashboardState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(DashboardState::new()))
}
