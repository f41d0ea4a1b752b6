//! Monitor, roster and status types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a monitor or of the whole status page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Up,
    Down,
    Error,
    Loading,
}

/// Page-wide aggregate status, derived from the status-page badge
pub type OverallStatus = Status;

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => write!(f, "up"),
            Status::Down => write!(f, "down"),
            Status::Error => write!(f, "error"),
            Status::Loading => write!(f, "loading"),
        }
    }
}

/// A monitor as listed on a status page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub monitor_type: String,
    #[serde(rename = "sendUrl", default, skip_serializing_if = "Option::is_none")]
    pub send_url: Option<serde_json::Value>,
}

/// A monitor together with its most recently fetched status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorWithStatus {
    #[serde(flatten)]
    pub monitor: Monitor,
    pub status: Status,
    #[serde(rename = "lastCheck", default)]
    pub last_check: Option<String>,
}

impl MonitorWithStatus {
    pub fn loading(monitor: Monitor) -> Self {
        Self {
            monitor,
            status: Status::Loading,
            last_check: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.monitor.id
    }
}

/// Result of a single monitor status lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReading {
    pub status: Status,
    #[serde(rename = "lastCheck", default)]
    pub last_check: Option<String>,
}

impl StatusReading {
    pub fn error() -> Self {
        Self {
            status: Status::Error,
            last_check: None,
        }
    }
}

/// Status page configuration block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPageConfig {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// A named group of monitors on a status page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorGroup {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(rename = "monitorList", default)]
    pub monitor_list: Vec<Monitor>,
}

/// Body of `GET /api/status-page/{slug}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPageData {
    #[serde(default)]
    pub config: StatusPageConfig,
    #[serde(rename = "publicGroupList", default)]
    pub public_group_list: Vec<MonitorGroup>,
    #[serde(default)]
    pub incident: Option<serde_json::Value>,
    #[serde(rename = "maintenanceList", default)]
    pub maintenance_list: Vec<serde_json::Value>,
}

impl StatusPageData {
    /// Flatten all groups into one roster, group order first, then in-group
    /// order. Every entry starts out `Loading`.
    pub fn roster(&self) -> Vec<MonitorWithStatus> {
        self.public_group_list
            .iter()
            .flat_map(|group| group.monitor_list.iter().cloned())
            .map(MonitorWithStatus::loading)
            .collect()
    }
}
