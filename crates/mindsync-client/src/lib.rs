//! # mindsync-client
//!
//! Supabase clients for mindsync:
//! - [`SupabaseClient`] -- PostgREST row operations (insert/update/delete,
//!   bulk upsert, exact counts, paged selects) over reqwest
//! - [`RealtimeFeed`] -- the row-level change feed over websocket, decoded
//!   into [`mindsync_core::ChangeEvent`]s
//!
//! Both are built from an explicit [`mindsync_config::SupabaseConfig`]; there
//! is no ambient client state. The relay holds one feed against the source
//! project and one REST client against the target; the copier and verifier
//! hold one REST client per side.

mod error;
mod http;
mod realtime;
mod rest;

pub use error::ClientError;
pub use realtime::{RealtimeFeed, TableChange};
pub use rest::SupabaseClient;
