//! Status page roster and aggregate badge

use serde::Deserialize;

use crate::io::HttpClient;
use crate::monitor::{OverallStatus, Status, StatusPageData};
use crate::svg::parse_status_from_svg;
use crate::{KumaError, Result};

#[derive(Debug, Deserialize)]
struct BadgeJson {
    #[serde(default)]
    status: Option<String>,
}

/// Fetch the status page and its monitor roster
pub async fn fetch_status_page(
    http: &dyn HttpClient,
    server_url: &str,
    status_page_id: &str,
) -> Result<StatusPageData> {
    let url = format!("{}/api/status-page/{}", server_url, status_page_id);
    tracing::debug!("Fetching status page from {}", url);

    let response = http.get(&url).await?;
    if !response.is_success() {
        return Err(KumaError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }

    if !response.is_json() {
        tracing::warn!(
            "Non-JSON response received from {}: {}",
            url,
            response.body_preview()
        );
        return Err(KumaError::Format(
            "Server returned non-JSON response. Check your server URL and status page ID."
                .to_string(),
        ));
    }

    let page: StatusPageData = serde_json::from_str(&response.body).map_err(|e| {
        KumaError::Format(format!("Could not parse status page '{}': {}", status_page_id, e))
    })?;

    tracing::debug!(
        "Status page '{}' has {} groups",
        status_page_id,
        page.public_group_list.len()
    );
    Ok(page)
}

/// Fetch the page-wide status badge.
///
/// Fails open: anything other than a clear `down`/`error` signal reads as
/// `Up`, the per-monitor list is what surfaces real problems.
pub async fn fetch_overall_status(
    http: &dyn HttpClient,
    server_url: &str,
    status_page_id: &str,
) -> OverallStatus {
    let url = format!("{}/api/status-page/{}/badge", server_url, status_page_id);

    let response = match http.get(&url).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch overall status: {}", e);
            return Status::Up;
        }
    };

    if !response.is_success() {
        tracing::debug!("Badge endpoint returned {}", response.status);
        return Status::Up;
    }

    if response.is_json() {
        return match serde_json::from_str::<BadgeJson>(&response.body) {
            Ok(badge) => match badge.status.as_deref() {
                Some("down") => Status::Down,
                Some("error") => Status::Error,
                _ => Status::Up,
            },
            Err(e) => {
                tracing::debug!("Unparseable badge JSON: {}", e);
                Status::Up
            }
        };
    }

    if response.is_svg() {
        return parse_status_from_svg(&response.body);
    }

    Status::Up
}

/// What a connection check found at the status page URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCheck {
    /// JSON status page, everything is in order
    Json,
    /// The server answered with an SVG badge
    SvgBadge,
    /// Reachable, but the answer is neither JSON nor a badge. Usually a wrong
    /// status page id.
    NonJson,
}

impl ConnectionCheck {
    pub fn message(&self) -> &'static str {
        match self {
            ConnectionCheck::Json => "Connection successful!",
            ConnectionCheck::SvgBadge => "Connection successful! (SVG badge response detected)",
            ConnectionCheck::NonJson => {
                "Connection successful but server returned non-JSON response. This might indicate an issue with the status page ID."
            }
        }
    }
}

/// Probe the status page endpoint for the settings screen
pub async fn test_connection(
    http: &dyn HttpClient,
    server_url: &str,
    status_page_id: &str,
) -> Result<ConnectionCheck> {
    let config = crate::config::ConnectionConfig::new(server_url, status_page_id)?;
    let url = format!(
        "{}/api/status-page/{}",
        config.server_url, config.status_page_id
    );
    tracing::info!("Testing connection to {}", url);

    let response = http.get(&url).await?;
    if !response.is_success() {
        tracing::warn!("Server response: {}", response.body_preview());
        return Err(KumaError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }

    Ok(if response.is_json() {
        ConnectionCheck::Json
    } else if response.is_svg() {
        ConnectionCheck::SvgBadge
    } else {
        ConnectionCheck::NonJson
    })
}
