//! Bulk copy error types.

use thiserror::Error;

/// Errors raised during a bulk table copy.
///
/// The copy is fail-fast: the first failing page aborts the run, naming the
/// table it died on.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A page read or batch write failed.
    #[error("copy failed on table {table}: {source}")]
    Copy {
        /// Table being copied when the failure occurred.
        table: String,
        /// The underlying client failure.
        source: mindsync_client::ClientError,
    },
}
