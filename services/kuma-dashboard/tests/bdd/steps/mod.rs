//! BDD step definitions for kuma-dashboard

pub mod cache_steps;
pub mod heartbeat_steps;
pub mod server_steps;
