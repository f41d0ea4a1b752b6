//! Heartbeat history for a single monitor
//!
//! The heartbeat endpoint is per status page, not per monitor, and comes in
//! two shapes depending on the server version:
//!
//! - `{"heartbeatList": {"<monitor id>": [...]}}`
//! - `[{"monitorId": 1, ...}, ...]`
//!
//! Records name their latency either `ping` or `duration`. Both quirks are
//! resolved here so the rest of the crate only sees [`Heartbeat`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::io::HttpClient;
use crate::monitor::Status;

/// Maximum number of heartbeats returned for one monitor
pub const MAX_HEARTBEATS: usize = 50;

/// One recorded up/down sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub id: String,
    #[serde(rename = "monitorId")]
    pub monitor_id: u64,
    pub status: Status,
    pub msg: String,
    pub time: String,
    #[serde(rename = "ping")]
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHeartbeat {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    status: Value,
    #[serde(default)]
    msg: Option<Value>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    ping: Option<Value>,
    #[serde(default)]
    duration: Option<Value>,
}

impl RawHeartbeat {
    fn normalize(self, monitor_id: u64) -> Heartbeat {
        let time = self.time.as_ref().and_then(value_to_text).unwrap_or_default();
        let id = self
            .id
            .as_ref()
            .and_then(value_to_key)
            .unwrap_or_else(|| time.clone());
        let status = if self.status.as_f64() == Some(1.0) {
            Status::Up
        } else {
            Status::Down
        };

        Heartbeat {
            id,
            monitor_id,
            status,
            msg: self.msg.as_ref().and_then(value_to_text).unwrap_or_default(),
            time,
            latency_ms: self
                .ping
                .as_ref()
                .and_then(value_to_f64)
                .or_else(|| self.duration.as_ref().and_then(value_to_f64)),
        }
    }
}

fn value_to_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers as-is, numeric strings parsed. Anything else has no value.
fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_matches_id(value: &Value, monitor_id: u64) -> bool {
    match value {
        Value::Number(n) => n.as_u64() == Some(monitor_id),
        Value::String(s) => s.trim().parse::<u64>().ok() == Some(monitor_id),
        _ => false,
    }
}

fn parse_records(items: &[Value]) -> Vec<RawHeartbeat> {
    items
        .iter()
        .filter_map(|item| match RawHeartbeat::deserialize(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::debug!("Skipping malformed heartbeat record: {}", e);
                None
            }
        })
        .collect()
}

/// Pick the records belonging to `monitor_id` out of either response shape
fn select_records(payload: &Value, monitor_id: u64) -> Vec<RawHeartbeat> {
    match payload {
        Value::Object(map) => {
            let Some(Value::Object(list)) = map.get("heartbeatList") else {
                return Vec::new();
            };
            let entry = list.get(&monitor_id.to_string()).or_else(|| {
                list.iter()
                    .find(|(key, _)| key.trim().parse::<u64>().ok() == Some(monitor_id))
                    .map(|(_, value)| value)
            });
            match entry {
                Some(Value::Array(items)) => parse_records(items),
                _ => Vec::new(),
            }
        }
        Value::Array(items) => {
            let matching: Vec<Value> = items
                .iter()
                .filter(|item| {
                    item.get("monitorId")
                        .or_else(|| item.get("monitor_id"))
                        .is_some_and(|id| value_matches_id(id, monitor_id))
                })
                .cloned()
                .collect();
            parse_records(&matching)
        }
        _ => Vec::new(),
    }
}

/// Parse a heartbeat timestamp.
///
/// Kuma reports `YYYY-MM-DD HH:MM:SS[.fff]` in UTC; newer builds may send
/// RFC 3339.
pub fn parse_timestamp(time: &str) -> Option<DateTime<Utc>> {
    let time = time.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(time) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Normalize, sort newest first and cap at [`MAX_HEARTBEATS`]
pub fn normalize_heartbeats(payload: &Value, monitor_id: u64) -> Vec<Heartbeat> {
    let mut heartbeats: Vec<Heartbeat> = select_records(payload, monitor_id)
        .into_iter()
        .map(|raw| raw.normalize(monitor_id))
        .collect();

    // Unparseable timestamps sort after every dated sample.
    heartbeats.sort_by_cached_key(|hb| {
        std::cmp::Reverse(parse_timestamp(&hb.time).map(|t| t.timestamp_millis()))
    });
    heartbeats.truncate(MAX_HEARTBEATS);
    heartbeats
}

/// Fetch the most recent heartbeats of one monitor.
///
/// Heartbeats are supplementary detail, so every failure degrades to an
/// empty list.
pub async fn get_heartbeats(
    http: &dyn HttpClient,
    server_url: &str,
    status_page_id: &str,
    monitor_id: u64,
) -> Vec<Heartbeat> {
    if server_url.is_empty() {
        tracing::debug!("No server URL for heartbeats");
        return Vec::new();
    }

    let url = format!(
        "{}/api/status-page/heartbeat/{}",
        server_url, status_page_id
    );
    tracing::debug!("Fetching heartbeats for monitor {} from {}", monitor_id, url);

    let response = match http.get(&url).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Error fetching heartbeats: {}", e);
            return Vec::new();
        }
    };

    if !response.is_success() {
        tracing::warn!("Heartbeats endpoint returned {}", response.status);
        return Vec::new();
    }

    if !response.is_json() {
        tracing::warn!("Non-JSON response for heartbeats");
        return Vec::new();
    }

    let payload: Value = match serde_json::from_str(&response.body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Unparseable heartbeat response: {}", e);
            return Vec::new();
        }
    };

    let heartbeats = normalize_heartbeats(&payload, monitor_id);
    tracing::debug!(
        "Found {} heartbeats for monitor {}",
        heartbeats.len(),
        monitor_id
    );
    heartbeats
}
