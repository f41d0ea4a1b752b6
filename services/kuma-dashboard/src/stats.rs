//! Derived figures for the monitor detail view

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::heartbeat::{parse_timestamp, Heartbeat};
use crate::monitor::Status;

/// Summary of a heartbeat window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatStats {
    pub count: usize,
    /// Share of `up` samples, rounded to a whole percent. 0 with no samples.
    pub uptime_percentage: u32,
    /// Mean of positive latencies, rounded. 0 when there are none.
    pub average_latency_ms: u64,
    /// Time of the most recent `down` sample
    pub last_down: Option<String>,
}

impl HeartbeatStats {
    /// Compute stats over heartbeats ordered newest first
    pub fn from_heartbeats(heartbeats: &[Heartbeat]) -> Self {
        let count = heartbeats.len();
        let uptime_percentage = if count == 0 {
            0
        } else {
            let up = heartbeats
                .iter()
                .filter(|hb| hb.status == Status::Up)
                .count();
            ((up as f64 / count as f64) * 100.0).round() as u32
        };

        let latencies: Vec<f64> = heartbeats
            .iter()
            .filter_map(|hb| hb.latency_ms)
            .filter(|ms| *ms > 0.0)
            .collect();
        let average_latency_ms = if latencies.is_empty() {
            0
        } else {
            (latencies.iter().sum::<f64>() / latencies.len() as f64).round() as u64
        };

        let last_down = heartbeats
            .iter()
            .find(|hb| hb.status == Status::Down)
            .map(|hb| hb.time.clone());

        Self {
            count,
            uptime_percentage,
            average_latency_ms,
            last_down,
        }
    }
}

/// "Just now", "5m ago", "3h ago", "2d ago", or the date for anything older
/// than a week. Input that does not parse is returned as-is.
pub fn format_relative_time(time: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(time) else {
        return time.to_string();
    };
    let minutes = (now - at).num_minutes();
    let hours = (now - at).num_hours();
    let days = (now - at).num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// Milliseconds below one second, seconds with one decimal above. A missing
/// or zero latency has no display value.
pub fn format_latency(latency_ms: Option<f64>) -> Option<String> {
    match latency_ms {
        Some(ms) if ms > 0.0 && ms < 1000.0 => Some(format!("{}ms", ms.round() as u64)),
        Some(ms) if ms >= 1000.0 => Some(format!("{:.1}s", ms / 1000.0)),
        _ => None,
    }
}
