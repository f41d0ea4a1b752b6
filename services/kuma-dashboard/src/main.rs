//! Kuma Dashboard CLI
//!
//! Terminal front end for an Uptime Kuma status page.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use kuma_dashboard::config::keys;
use kuma_dashboard::state::DashboardState;
use kuma_dashboard::stats::{format_latency, format_relative_time};
use kuma_dashboard::{
    build_client, spawn_engine, Engine, JsonFileStore, MonitorDetail, RefreshTrigger, Settings,
    Status,
};
use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kuma-dashboard")]
#[command(about = "Status-page client for Uptime Kuma")]
#[command(version)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "kuma-dashboard.json")]
    settings: PathBuf,

    /// Server URL (overrides the settings file)
    #[arg(long)]
    server_url: Option<String>,

    /// Status page id (overrides the settings file)
    #[arg(long)]
    page_id: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_seconds: u64,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh once and print every monitor
    Status,
    /// Keep refreshing; press Enter to refresh now
    Watch,
    /// Show status and heartbeat history of one monitor
    Monitor {
        id: u64,
        /// Number of heartbeats to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Check that the server URL and status page id work
    TestConnection,
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins over --log-level when set
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str().to_lowercase())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: settings={:?}, server_url={:?}, page_id={:?}",
        args.settings,
        args.server_url,
        args.page_id
    );

    let store = JsonFileStore::new(&args.settings);
    let mut settings = Settings::load(&store).await?;
    if let Some(server_url) = &args.server_url {
        settings.server_url = server_url.clone();
    }
    if let Some(page_id) = &args.page_id {
        settings.status_page_id = page_id.clone();
    }
    let timeout = Duration::from_secs(args.timeout_seconds);

    match args.command {
        Command::Status => {
            let client = build_client(&settings, timeout);
            let state = kuma_dashboard::state::new_state_handle();
            let engine = Engine::new(
                client,
                &settings,
                state.clone(),
                CancellationToken::new(),
            );
            engine.refresh(RefreshTrigger::Manual).await.settled().await;
            print_dashboard(&*state.read().await);
        }
        Command::Watch => watch(&settings, timeout).await,
        Command::Monitor { id, limit } => {
            let client = build_client(&settings, timeout);
            client.connection()?;
            let detail = client.load_detail(id).await;
            print_detail(&detail, limit);
        }
        Command::TestConnection => {
            let client = build_client(&settings, timeout);
            let check = client.test_connection().await?;
            println!("{}", check.message());
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{:<24} {}", keys::SERVER_URL, settings.server_url);
                println!("{:<24} {}", keys::STATUS_PAGE_ID, settings.status_page_id);
                println!("{:<24} {}", keys::AUTO_REFRESH, settings.auto_refresh);
                println!("{:<24} {}", keys::REFRESH_INTERVAL, settings.refresh_interval);
            }
            ConfigAction::Set { key, value } => {
                let mut stored = Settings::load(&store).await?;
                stored.set_value(&key, &value)?;
                stored.save(&store).await?;
                println!("Settings saved to {}", store.path().display());
            }
        },
    }

    Ok(())
}

async fn watch(settings: &Settings, timeout: Duration) {
    let cancel = CancellationToken::new();
    let client = build_client(settings, timeout);
    let (state, triggers) = spawn_engine(client, settings, cancel.clone());

    let stdin_cancel = cancel.clone();
    let stdin_state = state.clone();
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            let trigger = if stdin_state.read().await.error.is_some() {
                RefreshTrigger::Retry
            } else {
                RefreshTrigger::Manual
            };
            if triggers.send(trigger).await.is_err() || stdin_cancel.is_cancelled() {
                break;
            }
        }
    });

    let mut last_printed = None;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_millis(500)) => {}
        }
        let state = state.read().await;
        let pending = state
            .monitors
            .iter()
            .filter(|m| m.status == Status::Loading)
            .count();
        let fingerprint = (state.generation, state.loading, pending);
        if state.loading || last_printed == Some(fingerprint) {
            continue;
        }
        print_dashboard(&state);
        last_printed = Some(fingerprint);
    }
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Up => "UP",
        Status::Down => "DOWN",
        Status::Error => "ERROR",
        Status::Loading => "...",
    }
}

fn print_dashboard(state: &DashboardState) {
    let summary = state.summary();
    println!();
    println!("{}", summary.headline);
    if let Some(error) = &state.error {
        println!("Error: {}", error);
        if state.stale {
            println!("(showing monitors from the last successful refresh)");
        }
    }
    println!(
        "{} monitors, {} up, {} down, {} errors",
        summary.total, summary.up, summary.down, summary.errors
    );
    for monitor in &state.monitors {
        println!(
            "  {:>6}  {:<6} {:<32} {}",
            monitor.id(),
            status_marker(monitor.status),
            monitor.monitor.name,
            monitor.last_check.as_deref().unwrap_or("-")
        );
    }
}

fn print_detail(detail: &MonitorDetail, limit: usize) {
    let now = chrono::Utc::now();
    println!(
        "Monitor {}: {}{}",
        detail.monitor_id,
        status_marker(detail.status.status),
        if detail.from_cache { " (cached)" } else { "" }
    );
    if let Some(last_check) = &detail.status.last_check {
        println!("Last check: {}", last_check);
    }
    println!(
        "Uptime {}%  Avg ping {}ms  Checks {}  Last down {}",
        detail.stats.uptime_percentage,
        detail.stats.average_latency_ms,
        detail.stats.count,
        detail
            .stats
            .last_down
            .as_deref()
            .map(|t| format_relative_time(t, now))
            .unwrap_or_else(|| "Never".to_string())
    );
    if detail.heartbeats.is_empty() {
        println!("No heartbeats");
        return;
    }
    println!(
        "Showing last {} of {} heartbeats",
        limit.min(detail.heartbeats.len()),
        detail.heartbeats.len()
    );
    for hb in detail.heartbeats.iter().take(limit) {
        println!(
            "  {:<6} {:<10} {:>7}  {}",
            status_marker(hb.status),
            format_relative_time(&hb.time, now),
            format_latency(hb.latency_ms).unwrap_or_default(),
            hb.msg
        );
    }
}
