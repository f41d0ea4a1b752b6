//! BDD step definitions for heartbeat history

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use serde_json::json;

use crate::world::{parse_status, KumaWorld, Reply};

const HEARTBEAT_PATH: &str = "/api/status-page/heartbeat/vroom";

#[given("the heartbeat endpoint returns:")]
fn heartbeat_endpoint_returns(world: &mut KumaWorld, step: &Step) {
    let body = step.docstring.as_deref().expect("JSON docstring missing");
    world.route(HEARTBEAT_PATH, Reply::json(body));
}

#[given(expr = "the heartbeat endpoint returns {int} minutely heartbeats for monitor {int}")]
fn heartbeat_endpoint_returns_many(world: &mut KumaWorld, count: u32, monitor_id: u64) {
    let list: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "status": 1,
                "msg": "",
                "time": format!("2024-05-01 {:02}:{:02}:00", i / 60, i % 60),
                "ping": 10 + i
            })
        })
        .collect();
    let body = json!({ "heartbeatList": { monitor_id.to_string(): list } });
    world.route(HEARTBEAT_PATH, Reply::json(&body.to_string()));
}

#[given("the heartbeat endpoint is unreachable")]
fn heartbeat_endpoint_unreachable(world: &mut KumaWorld) {
    world.route(HEARTBEAT_PATH, Reply::Unreachable);
}

#[when(expr = "heartbeats for monitor {int} are requested")]
async fn heartbeats_requested(world: &mut KumaWorld, monitor_id: u64) {
    world.heartbeats = Some(world.client().get_heartbeats(monitor_id).await);
}

#[then(expr = "{int} heartbeats are returned")]
fn heartbeats_returned(world: &mut KumaWorld, count: usize) {
    let heartbeats = world.heartbeats.as_ref().expect("heartbeats not requested");
    assert_eq!(heartbeats.len(), count);
}

#[then(expr = "heartbeat {int} has status {string} at {string}")]
fn heartbeat_has_status_at(world: &mut KumaWorld, index: usize, status: String, time: String) {
    let heartbeats = world.heartbeats.as_ref().expect("heartbeats not requested");
    let heartbeat = &heartbeats[index - 1];
    assert_eq!(heartbeat.status, parse_status(&status));
    assert_eq!(heartbeat.time, time);
}

#[then(expr = "heartbeat {int} has latency {float}")]
fn heartbeat_has_latency(world: &mut KumaWorld, index: usize, latency_ms: f64) {
    let heartbeats = world.heartbeats.as_ref().expect("heartbeats not requested");
    assert_eq!(heartbeats[index - 1].latency_ms, Some(latency_ms));
}

#[then(expr = "heartbeat {int} has no latency")]
fn heartbeat_has_no_latency(world: &mut KumaWorld, index: usize) {
    let heartbeats = world.heartbeats.as_ref().expect("heartbeats not requested");
    assert_eq!(heartbeats[index - 1].latency_ms, None);
}

#[then(expr = "the newest heartbeat is at {string}")]
fn newest_heartbeat_at(world: &mut KumaWorld, time: String) {
    let heartbeats = world.heartbeats.as_ref().expect("heartbeats not requested");
    assert_eq!(heartbeats.first().map(|h| h.time.as_str()), Some(time.as_str()));
}
