//! Cross-cutting error types for mindsync.
//!
//! Errors tied to one subsystem (HTTP client, relay, verifier) live in their
//! own crates; these are the ones any crate may raise.

use thiserror::Error;

/// Errors that can be raised by any mindsync crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A table name outside the fixed replication set was requested.
    #[error("table not in the replication set: {0}")]
    UnknownTable(String),

    /// A row image carried no usable `id` column.
    #[error("row has no usable id in table {table}: {reason}")]
    MissingId {
        /// Table the row belongs to.
        table: String,
        /// What was found instead of a scalar id.
        reason: String,
    },
}
