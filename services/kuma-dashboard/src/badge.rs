//! Per-monitor status badge

use serde_json::Value;

use crate::io::HttpClient;
use crate::monitor::{Status, StatusReading};
use crate::svg::parse_status_from_svg;

/// Fields of a JSON badge, kept as raw values. Any well-formed JSON body
/// yields one; missing fields are `None`.
#[derive(Debug)]
struct MonitorBadgeJson {
    status: Option<Value>,
    last_check: Option<Value>,
}

impl MonitorBadgeJson {
    fn from_value(body: &Value) -> Self {
        Self {
            status: body.get("status").cloned(),
            last_check: body.get("lastCheck").cloned(),
        }
    }

    /// Only the literal string `"up"` is up; any other JSON value is down.
    fn status(&self) -> Status {
        match &self.status {
            Some(Value::String(s)) if s == "up" => Status::Up,
            _ => Status::Down,
        }
    }

    /// Server check time, numbers stringified. Empty or null is absent.
    fn last_check(&self) -> Option<String> {
        match self.last_check.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Local wall-clock time used as a stand-in `lastCheck`.
///
/// Not a server timestamp. SVG badges carry no check time at all.
pub fn local_time_string() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Fetch and normalize the live status of one monitor.
///
/// Never fails: an unreachable server, a non-2xx answer or an unknown body
/// all read as `Error` for this monitor only.
pub async fn get_monitor_status(
    http: &dyn HttpClient,
    server_url: &str,
    monitor_id: u64,
) -> StatusReading {
    if server_url.is_empty() {
        tracing::debug!("No server URL for monitor {} status", monitor_id);
        return StatusReading::error();
    }

    let url = format!("{}/api/badge/{}/status", server_url, monitor_id);
    tracing::debug!("Fetching status for monitor {} from {}", monitor_id, url);

    let response = match http.get(&url).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Error fetching monitor {} status: {}", monitor_id, e);
            return StatusReading::error();
        }
    };

    if !response.is_success() {
        tracing::warn!(
            "Monitor {} status endpoint returned {}",
            monitor_id,
            response.status
        );
        return StatusReading::error();
    }

    if response.is_json() {
        return match serde_json::from_str::<Value>(&response.body) {
            Ok(body) => {
                let badge = MonitorBadgeJson::from_value(&body);
                StatusReading {
                    status: badge.status(),
                    last_check: Some(badge.last_check().unwrap_or_else(local_time_string)),
                }
            }
            Err(e) => {
                tracing::warn!("Monitor {} returned invalid JSON: {}", monitor_id, e);
                StatusReading::error()
            }
        };
    }

    if response.is_svg() {
        let status = parse_status_from_svg(&response.body);
        tracing::debug!("Monitor {} SVG status: {}", monitor_id, status);
        return StatusReading {
            status,
            last_check: Some(local_time_string()),
        };
    }

    tracing::warn!(
        "Monitor {} returned unexpected response format: {}",
        monitor_id,
        response.body_preview()
    );
    StatusReading::error()
}
