//! # mindsync-core
//!
//! Core types shared across all mindsync crates:
//! - The fixed registry of replicated tables
//! - The row-level change-event model consumed by the relay
//! - Latency percentile statistics used by the verifier
//! - Cross-cutting error types
//!
//! Domain-specific errors (e.g., `ClientError`, `VerifyError`) are defined in
//! their respective crates; everything that converges at the CLI boundary is
//! folded into `anyhow` there.

pub mod errors;
pub mod event;
pub mod stats;
pub mod tables;

pub use errors::CoreError;
pub use event::{ChangeEvent, ChangeKind, RowId};
pub use stats::{p99, percentile};
pub use tables::{REPLICATED_TABLES, is_replicated};
