//! BDD step definitions for the preload cache and detail view

use std::time::Duration;

use cucumber::{then, when};

use crate::world::{parse_status, KumaWorld};

#[when(expr = "monitor {int} is preloaded")]
async fn monitor_preloaded(world: &mut KumaWorld, monitor_id: u64) {
    world.client().preload(monitor_id).await;
}

#[when(expr = "{int} seconds pass")]
fn seconds_pass(world: &mut KumaWorld, seconds: u64) {
    world.clock().advance(Duration::from_secs(seconds));
}

#[when(expr = "the cache is read for monitor {int}")]
async fn cache_read(world: &mut KumaWorld, monitor_id: u64) {
    world.cached = Some(world.client().get_cached(monitor_id).await);
}

#[when(expr = "the detail view for monitor {int} is opened")]
async fn detail_opened(world: &mut KumaWorld, monitor_id: u64) {
    world.detail = Some(world.client().load_detail(monitor_id).await);
}

#[then(expr = "a cached entry with status {string} is returned")]
fn cached_entry_returned(world: &mut KumaWorld, status: String) {
    let entry = world
        .cached
        .as_ref()
        .expect("cache not read")
        .as_ref()
        .expect("no cached entry");
    assert_eq!(entry.status.status, parse_status(&status));
}

#[then(expr = "the cached entry holds {int} heartbeats")]
fn cached_entry_heartbeats(world: &mut KumaWorld, count: usize) {
    let entry = world
        .cached
        .as_ref()
        .expect("cache not read")
        .as_ref()
        .expect("no cached entry");
    assert_eq!(entry.heartbeats.len(), count);
}

#[then("no cached entry is returned")]
fn no_cached_entry(world: &mut KumaWorld) {
    let cached = world.cached.as_ref().expect("cache not read");
    assert!(cached.is_none(), "unexpected entry {:?}", cached);
}

#[then("the detail comes from the cache")]
fn detail_from_cache(world: &mut KumaWorld) {
    assert!(world.detail.as_ref().expect("detail not opened").from_cache);
}

#[then("the detail is fetched live")]
fn detail_live(world: &mut KumaWorld) {
    assert!(!world.detail.as_ref().expect("detail not opened").from_cache);
}

#[then(expr = "the detail shows {int} percent uptime")]
fn detail_uptime(world: &mut KumaWorld, percent: u32) {
    let detail = world.detail.as_ref().expect("detail not opened");
    assert_eq!(detail.stats.uptime_percentage, percent);
}
