//! The relay engine: routes feed events into per-table bounded queues and
//! applies them to the destination.
//!
//! One worker per table keeps same-table events in feed order while distinct
//! tables proceed concurrently. A full queue applies backpressure to the
//! router (and through it to the feed) instead of letting slow destination
//! writes pile up unboundedly. When the event stream closes, every worker
//! drains what it has queued before reporting its totals.

use std::collections::BTreeMap;
use std::sync::Arc;

use mindsync_client::TableChange;
use mindsync_config::RelayConfig;
use mindsync_core::{ChangeEvent, REPLICATED_TABLES, RowId};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::writer::ChangeWriter;

/// Per-table outcome totals reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTotals {
    /// Events whose destination write succeeded.
    pub applied: u64,
    /// Events dropped after a failed or unkeyable write.
    pub dropped: u64,
}

/// What the relay did over its lifetime, per table.
#[derive(Debug, Default)]
pub struct RelaySummary {
    /// Totals keyed by table name; tables with no traffic are omitted.
    pub per_table: BTreeMap<String, TableTotals>,
}

impl RelaySummary {
    /// Sum of applied events across all tables.
    #[must_use]
    pub fn applied(&self) -> u64 {
        self.per_table.values().map(|t| t.applied).sum()
    }

    /// Sum of dropped events across all tables.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.per_table.values().map(|t| t.dropped).sum()
    }
}

/// Routes change events to per-table apply workers.
pub struct RelayEngine<W> {
    writer: Arc<W>,
    queue_capacity: usize,
}

impl<W> RelayEngine<W>
where
    W: ChangeWriter + Send + Sync + 'static,
{
    /// Build an engine around a destination writer.
    #[must_use]
    pub fn new(writer: W, config: &RelayConfig) -> Self {
        Self {
            writer: Arc::new(writer),
            queue_capacity: config.queue_capacity.max(1),
        }
    }

    /// Consume `events` until the channel closes, then drain every queue and
    /// report totals. Events for tables outside the replication set are
    /// dropped with a warning; they indicate a feed misconfiguration.
    pub async fn run(self, mut events: mpsc::Receiver<TableChange>) -> RelaySummary {
        let mut queues: BTreeMap<&'static str, mpsc::Sender<ChangeEvent>> = BTreeMap::new();
        let mut workers = JoinSet::new();

        for table in REPLICATED_TABLES {
            let (tx, rx) = mpsc::channel(self.queue_capacity);
            queues.insert(table, tx);
            let writer = Arc::clone(&self.writer);
            workers.spawn(worker(writer, table, rx));
        }

        while let Some(change) = events.recv().await {
            let Some(queue) = queues.get(change.table.as_str()) else {
                warn!(table = %change.table, "event for table outside the replication set, dropping");
                continue;
            };
            // A closed queue means the worker panicked; surface the loss
            // rather than silently routing into the void.
            if queue.send(change.event).await.is_err() {
                error!(table = %change.table, "apply worker is gone, dropping event");
            }
        }

        // Feed is done. Close the queues so workers drain and exit.
        drop(queues);

        let mut summary = RelaySummary::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((table, totals)) => {
                    if totals != TableTotals::default() {
                        summary.per_table.insert(table.to_string(), totals);
                    }
                }
                Err(join_error) => error!(%join_error, "apply worker panicked"),
            }
        }
        info!(
            applied = summary.applied(),
            dropped = summary.dropped(),
            "relay drained"
        );
        summary
    }
}

/// Apply events for one table, in queue order, until the queue closes.
///
/// Failure policy: a rejected destination write (or an unkeyable row image)
/// drops that one event with an error log and the worker moves on. The relay
/// never crashes on a single write; the at-most-once gap is observable in
/// the totals instead.
async fn worker<W>(
    writer: Arc<W>,
    table: &'static str,
    mut queue: mpsc::Receiver<ChangeEvent>,
) -> (&'static str, TableTotals)
where
    W: ChangeWriter + Send + Sync + 'static,
{
    let mut totals = TableTotals::default();
    while let Some(event) = queue.recv().await {
        let kind = event.kind();
        match apply(writer.as_ref(), table, event).await {
            Ok(()) => totals.applied += 1,
            Err(error) => {
                totals.dropped += 1;
                error!(table, event = %kind, %error, "destination write failed, continuing");
            }
        }
    }
    (table, totals)
}

/// Apply one event with exactly one destination write.
async fn apply<W: ChangeWriter>(
    writer: &W,
    table: &str,
    event: ChangeEvent,
) -> Result<(), RelayError> {
    match event {
        ChangeEvent::Insert { record } => writer.insert(table, &record).await?,
        ChangeEvent::Update { record } => {
            let id = RowId::from_row(table, &record)?;
            writer.update(table, &id, &record).await?;
        }
        ChangeEvent::Delete { old_record } => {
            let id = RowId::from_row(table, &old_record)?;
            writer.delete(table, &id).await?;
        }
    }
    Ok(())
}
