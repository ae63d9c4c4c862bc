//! # chronocode-host
//!
//! Process hosting the ChronoCode engines.
//!
//! This binary provides:
//! - a **timeline store** fed by tool notifications read as JSON lines on
//!   stdin (one `pre`/`post` notification per line)
//! - a **presence registry** whose membership changes are published on an
//!   in-process broadcast channel for a transport layer to relay
//! - a periodic **inactivity sweep** that evicts stale collaborators
//!
//! Logs go to stderr so stdout can carry the exported session.

mod config;
mod error;
mod ingest;

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use chronocode_presence::{spawn_sweeper, ChannelSink, PresenceRegistry};
use chronocode_shared::constants::APP_NAME;
use chronocode_timeline::{TimelineRecorder, TimelineStore};

use crate::config::HostConfig;
use crate::ingest::ingest_lines;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chronocode_host=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting {} host v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = HostConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Construct the engines
    // -----------------------------------------------------------------------
    let timeline = TimelineStore::new();
    let recorder = TimelineRecorder::new(timeline.clone())
        .with_default_session(config.default_session.clone());

    let sink = ChannelSink::default();
    let mut presence_rx = sink.subscribe();
    let presence = PresenceRegistry::new()
        .with_sink(Arc::new(sink))
        .with_default_max_users(config.max_users);

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------
    let sweeper = spawn_sweeper(
        presence.clone(),
        config.sweep_interval,
        config.inactivity_timeout_ms,
    );

    // Stand-in for a transport: log what it would relay.
    let relay_log = tokio::spawn(async move {
        loop {
            match presence_rx.recv().await {
                Ok(message) => debug!(
                    room = %message.room_id,
                    user = %message.user_id,
                    kind = ?message.kind,
                    "Presence message"
                ),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Presence log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Record notifications until stdin closes or Ctrl+C
    // -----------------------------------------------------------------------
    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = ingest_lines(&recorder, stdin) => {
            match result {
                Ok(stats) => info!(
                    recorded = stats.recorded,
                    skipped = stats.skipped,
                    "Notification input closed"
                ),
                Err(e) => {
                    tracing::error!(error = %e, "Notification intake failed");
                    sweeper.abort();
                    relay_log.abort();
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    sweeper.abort();
    relay_log.abort();

    // -----------------------------------------------------------------------
    // 6. Summarize and optionally export
    // -----------------------------------------------------------------------
    let bounds = timeline.bounds().await;
    info!(
        events = timeline.len().await,
        checkpoints = timeline.checkpoints().await.len(),
        start = bounds.start,
        end = bounds.end,
        rooms = presence.room_count().await,
        "Session summary"
    );

    if config.export_on_exit {
        println!("{}", timeline.serialize().await?);
    }

    Ok(())
}
