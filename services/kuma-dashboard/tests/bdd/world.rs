//! BDD test world for kuma-dashboard

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cucumber::World;
use kuma_dashboard::cache::{CacheEntry, ManualClock, PreloadCache};
use kuma_dashboard::heartbeat::Heartbeat;
use kuma_dashboard::io::{HttpClient, HttpResponse};
use kuma_dashboard::state::StateHandle;
use kuma_dashboard::{
    KumaClient, KumaError, MonitorDetail, OverallStatus, Settings, Status, StatusReading,
};

pub const SERVER_URL: &str = "http://kuma.test";

/// Canned answer for one path on the fake server
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Unreachable,
    /// The request never completes
    Hang,
}

impl Reply {
    fn ok(content_type: &str, body: &str) -> Self {
        Reply::Respond(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some(content_type.to_string()),
            body: body.to_string(),
        })
    }

    pub fn json(body: &str) -> Self {
        Self::ok("application/json; charset=utf-8", body)
    }

    pub fn svg(body: &str) -> Self {
        Self::ok("image/svg+xml", body)
    }

    pub fn html(body: &str) -> Self {
        Self::ok("text/html", body)
    }

    pub fn status(code: u16, text: &str) -> Self {
        Reply::Respond(HttpResponse {
            status: code,
            status_text: text.to_string(),
            ..Default::default()
        })
    }
}

/// Path-routed stand-in for a Kuma server. Unknown paths answer 404.
#[derive(Debug, Default)]
pub struct FakeKuma {
    routes: HashMap<String, Reply>,
}

#[async_trait]
impl HttpClient for FakeKuma {
    async fn get(&self, url: &str) -> kuma_dashboard::Result<HttpResponse> {
        let path = url.strip_prefix(SERVER_URL).unwrap_or(url);
        match self.routes.get(path) {
            Some(Reply::Respond(response)) => Ok(response.clone()),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Unreachable) => Err(KumaError::Transport(format!(
                "GET {} failed: connection refused",
                url
            ))),
            None => Ok(HttpResponse {
                status: 404,
                status_text: "Not Found".to_string(),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Default, World)]
pub struct KumaWorld {
    // Fake server
    pub routes: HashMap<String, Reply>,
    pub page_monitors: Vec<(u64, String)>,
    pub server_url: Option<String>,

    // Client under test
    pub clock: Option<Arc<ManualClock>>,
    pub client: Option<Arc<KumaClient>>,

    // Refresh testing
    pub state: Option<StateHandle>,
    pub fetch_error: Option<KumaError>,

    // Single-call results
    pub svg_status: Option<Status>,
    pub reading: Option<StatusReading>,
    pub overall: Option<OverallStatus>,
    pub heartbeats: Option<Vec<Heartbeat>>,
    pub cached: Option<Option<CacheEntry>>,
    pub detail: Option<MonitorDetail>,
}

impl KumaWorld {
    /// Install a route. The client is rebuilt on next use; the clock carries over.
    pub fn route(&mut self, path: &str, reply: Reply) {
        self.client = None;
        self.routes.insert(path.to_string(), reply);
    }

    pub fn settings(&self) -> Settings {
        Settings {
            server_url: self
                .server_url
                .clone()
                .unwrap_or_else(|| SERVER_URL.to_string()),
            ..Settings::default()
        }
    }

    pub fn clock(&mut self) -> Arc<ManualClock> {
        self.clock
            .get_or_insert_with(|| Arc::new(ManualClock::new(1_700_000_000_000)))
            .clone()
    }

    pub fn client(&mut self) -> Arc<KumaClient> {
        if let Some(client) = &self.client {
            return client.clone();
        }
        let settings = self.settings();
        let http = Arc::new(FakeKuma {
            routes: self.routes.clone(),
        });
        let client = Arc::new(KumaClient::new(
            &settings.server_url,
            &settings.status_page_id,
            http,
            PreloadCache::new(self.clock()),
        ));
        self.client = Some(client.clone());
        client
    }
}

pub fn parse_status(name: &str) -> Status {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .unwrap_or_else(|_| panic!("Unknown status: {}", name))
}
