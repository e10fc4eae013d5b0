//! # mindsync-relay
//!
//! The realtime change relay: subscribes to the source project's row-level
//! change feed for every replicated table and forwards each insert, update,
//! and delete to the target project.
//!
//! Delivery semantics, deliberately: per-table feed order is preserved by a
//! dedicated apply worker per table; cross-table order is not. A failed
//! destination write drops that one event (logged and counted) -- at-most-once
//! forwarding, with the loss visible in the shutdown summary rather than
//! silent. There is no retry queue and no persisted state.
//!
//! Shutdown: flip the provided watch channel (the CLI wires it to ctrl-c).
//! The feed leaves its channels, the engine drains every per-table queue,
//! and [`run_relay`] returns the per-table totals.

mod engine;
mod error;
mod writer;

pub use engine::{RelayEngine, RelaySummary, TableTotals};
pub use error::RelayError;
pub use writer::ChangeWriter;

use mindsync_client::{RealtimeFeed, SupabaseClient};
use mindsync_config::MindsyncConfig;
use mindsync_core::REPLICATED_TABLES;
use tokio::sync::{mpsc, watch};
use tracing::warn;

/// Run the relay until `shutdown` flips: source feed in, target writes out.
///
/// Constructs one realtime feed against `config.source` and one REST client
/// against `config.target`, then pumps events through the engine until the
/// feed ends and the queues drain.
///
/// # Errors
///
/// Returns [`RelayError`] when either client cannot be constructed. Runtime
/// write failures never surface here; they are logged and counted in the
/// returned summary.
pub async fn run_relay(
    config: &MindsyncConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<RelaySummary, RelayError> {
    let writer = SupabaseClient::new(&config.target)?;
    let tables = REPLICATED_TABLES.iter().map(ToString::to_string).collect();
    let feed = RealtimeFeed::new(&config.source, &config.relay, tables)?;

    let (events_tx, events_rx) = mpsc::channel(config.relay.queue_capacity.max(1));
    let feed_task = tokio::spawn(feed.run(events_tx, shutdown));

    let summary = RelayEngine::new(writer, &config.relay).run(events_rx).await;

    match feed_task.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => warn!(%error, "change feed ended with an error"),
        Err(join_error) => warn!(%join_error, "change feed task panicked"),
    }

    Ok(summary)
}
