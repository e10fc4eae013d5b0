//! # mindsync-migrate
//!
//! Bulk table copier: the one-shot migration the verifier later checks.
//! Walks the fixed table registry in order, streaming ordered pages out of
//! the source project and merging them into the target with upserts.
//! Sequential by design -- one table, one page, one write at a time -- and
//! fail-fast on the first error.

mod copier;
mod error;

pub use copier::{PAGE_SIZE, RowSink, RowSource, TableCopy, copy_table};
pub use error::MigrateError;
