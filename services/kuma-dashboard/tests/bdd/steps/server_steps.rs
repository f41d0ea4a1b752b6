//! Steps that shape what the fake Kuma server answers

use cucumber::{given, when};
use serde_json::json;

use crate::world::{KumaWorld, Reply};

const PAGE_PATH: &str = "/api/status-page/vroom";
const AGGREGATE_PATH: &str = "/api/status-page/vroom/badge";

fn badge_path(monitor_id: u64) -> String {
    format!("/api/badge/{}/status", monitor_id)
}

fn publish_page(world: &mut KumaWorld) {
    let monitors: Vec<_> = world
        .page_monitors
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name, "type": "http" }))
        .collect();
    let page = json!({
        "config": { "slug": "vroom", "title": "Vroom" },
        "publicGroupList": [{ "id": 1, "name": "Services", "monitorList": monitors }],
        "incident": null,
        "maintenanceList": []
    });
    world.route(PAGE_PATH, Reply::json(&page.to_string()));
}

#[given(expr = "the status page lists monitor {int} {string}")]
fn page_lists_monitor(world: &mut KumaWorld, monitor_id: u64, name: String) {
    world.page_monitors.push((monitor_id, name));
    publish_page(world);
}

#[given("the status page returns HTML")]
fn page_returns_html(world: &mut KumaWorld) {
    world.route(
        PAGE_PATH,
        Reply::html("<!DOCTYPE html><html><body>Uptime Kuma</body></html>"),
    );
}

#[when("the status page starts returning HTML")]
fn page_starts_returning_html(world: &mut KumaWorld) {
    page_returns_html(world);
}

#[given(expr = "the status page returns HTTP {int} {string}")]
fn page_returns_status(world: &mut KumaWorld, code: u16, text: String) {
    world.route(PAGE_PATH, Reply::status(code, &text));
}

#[given("the server is unreachable")]
fn server_unreachable(world: &mut KumaWorld) {
    world.route(PAGE_PATH, Reply::Unreachable);
    world.route(AGGREGATE_PATH, Reply::Unreachable);
}

#[given("no server URL is configured")]
fn no_server_url(world: &mut KumaWorld) {
    world.server_url = Some(String::new());
    world.client = None;
}

#[given(expr = "monitor {int} badge returns JSON status {string}")]
fn badge_returns_json(world: &mut KumaWorld, monitor_id: u64, status: String) {
    let body = json!({ "status": status });
    world.route(&badge_path(monitor_id), Reply::json(&body.to_string()));
}

#[given(expr = "monitor {int} badge returns JSON status {string} checked at {string}")]
fn badge_returns_json_with_check(
    world: &mut KumaWorld,
    monitor_id: u64,
    status: String,
    last_check: String,
) {
    let body = json!({ "status": status, "lastCheck": last_check });
    world.route(&badge_path(monitor_id), Reply::json(&body.to_string()));
}

#[given(expr = "monitor {int} badge returns HTTP {int}")]
fn badge_returns_status(world: &mut KumaWorld, monitor_id: u64, code: u16) {
    world.route(&badge_path(monitor_id), Reply::status(code, "Server Error"));
}

#[given(expr = "monitor {int} badge returns an SVG reading {string}")]
fn badge_returns_svg(world: &mut KumaWorld, monitor_id: u64, text: String) {
    let body = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><g><text x="5">Status</text><text x="60">{}</text></g></svg>"#,
        text
    );
    world.route(&badge_path(monitor_id), Reply::svg(&body));
}

#[given(expr = "monitor {int} badge returns invalid JSON")]
fn badge_returns_invalid_json(world: &mut KumaWorld, monitor_id: u64) {
    world.route(&badge_path(monitor_id), Reply::json("{not json"));
}

#[given(expr = "monitor {int} badge returns plain text")]
fn badge_returns_text(world: &mut KumaWorld, monitor_id: u64) {
    world.route(
        &badge_path(monitor_id),
        Reply::Respond(kuma_dashboard::io::HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some("text/plain".to_string()),
            body: "up".to_string(),
        }),
    );
}

#[given(expr = "monitor {int} badge never answers")]
fn badge_hangs(world: &mut KumaWorld, monitor_id: u64) {
    world.route(&badge_path(monitor_id), Reply::Hang);
}

#[given(expr = "monitor {int} badge is unreachable")]
fn badge_unreachable(world: &mut KumaWorld, monitor_id: u64) {
    world.route(&badge_path(monitor_id), Reply::Unreachable);
}

#[given(expr = "the aggregate badge returns JSON status {string}")]
fn aggregate_returns_json(world: &mut KumaWorld, status: String) {
    let body = json!({ "status": status });
    world.route(AGGREGATE_PATH, Reply::json(&body.to_string()));
}

#[given(expr = "the aggregate badge returns an SVG labelled {string}")]
fn aggregate_returns_svg(world: &mut KumaWorld, label: String) {
    let body = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" aria-label="Status: {}"><text>{}</text></svg>"#,
        label, label
    );
    world.route(AGGREGATE_PATH, Reply::svg(&body));
}

#[given("the aggregate badge returns HTML")]
fn aggregate_returns_html(world: &mut KumaWorld) {
    world.route(AGGREGATE_PATH, Reply::html("<html></html>"));
}

#[given("the aggregate badge is unreachable")]
fn aggregate_unreachable(world: &mut KumaWorld) {
    world.route(AGGREGATE_PATH, Reply::Unreachable);
}
