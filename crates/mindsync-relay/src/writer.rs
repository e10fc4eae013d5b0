//! Destination write seam.
//!
//! The engine applies events through [`ChangeWriter`] rather than a concrete
//! HTTP client so the queueing, ordering, and failure-policy behavior can be
//! exercised against an in-memory destination.

use mindsync_client::{ClientError, SupabaseClient};
use mindsync_core::RowId;
use serde_json::{Map, Value};

/// One write call against the destination per change event.
pub trait ChangeWriter {
    /// Insert the full new row image.
    fn insert(
        &self,
        table: &str,
        row: &Map<String, Value>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Overwrite the row matching `id` with the full new row image.
    fn update(
        &self,
        table: &str,
        id: &RowId,
        row: &Map<String, Value>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Delete the row matching `id`; absent rows are a no-op.
    fn delete(&self, table: &str, id: &RowId) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl ChangeWriter for SupabaseClient {
    fn insert(
        &self,
        table: &str,
        row: &Map<String, Value>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        Self::insert(self, table, row)
    }

    fn update(
        &self,
        table: &str,
        id: &RowId,
        row: &Map<String, Value>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        Self::update(self, table, id, row)
    }

    fn delete(
        &self,
        table: &str,
        id: &RowId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        Self::delete(self, table, id)
    }
}
