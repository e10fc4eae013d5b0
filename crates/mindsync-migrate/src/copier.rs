//! Sequential page-by-page table copy.
//!
//! One table at a time, ordered pages from the source, merged into the
//! target with upserts so a re-run converges instead of conflicting.

use mindsync_client::{ClientError, SupabaseClient};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::MigrateError;

/// Default rows per page.
pub const PAGE_SIZE: usize = 500;

/// Outcome of copying one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCopy {
    /// Table that was copied.
    pub table: String,
    /// Rows transferred.
    pub rows: u64,
    /// Pages fetched.
    pub pages: u64,
}

/// Ordered page reads from the copy source.
pub trait RowSource {
    /// Fetch one page of rows ordered by `id`.
    fn fetch_page(
        &self,
        table: &str,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Map<String, Value>>, ClientError>> + Send;
}

/// Batched merge writes into the copy target.
pub trait RowSink {
    /// Upsert a batch of rows, merging on the primary key.
    fn store_batch(
        &self,
        table: &str,
        rows: &[Map<String, Value>],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl RowSource for SupabaseClient {
    fn fetch_page(
        &self,
        table: &str,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Map<String, Value>>, ClientError>> + Send {
        self.select_page(table, offset, limit)
    }
}

impl RowSink for SupabaseClient {
    fn store_batch(
        &self,
        table: &str,
        rows: &[Map<String, Value>],
    ) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.upsert_batch(table, rows)
    }
}

/// Copy one table from `source` to `target`, page by page.
///
/// # Errors
///
/// Fail-fast: returns [`MigrateError::Copy`] on the first failing page read
/// or batch write.
pub async fn copy_table<S, D>(
    source: &S,
    target: &D,
    table: &str,
    page_size: usize,
) -> Result<TableCopy, MigrateError>
where
    S: RowSource,
    D: RowSink,
{
    let page_size = page_size.max(1);
    let mut offset = 0usize;
    let mut rows = 0u64;
    let mut pages = 0u64;

    loop {
        let page = source
            .fetch_page(table, offset, page_size)
            .await
            .map_err(|source| MigrateError::Copy {
                table: table.to_string(),
                source,
            })?;
        if page.is_empty() {
            break;
        }
        let fetched = page.len();
        target
            .store_batch(table, &page)
            .await
            .map_err(|source| MigrateError::Copy {
                table: table.to_string(),
                source,
            })?;

        rows += fetched as u64;
        pages += 1;
        offset += fetched;
        debug!(table, offset, "copied page");

        if fetched < page_size {
            break;
        }
    }

    info!(table, rows, pages, "table copied");
    Ok(TableCopy {
        table: table.to_string(),
        rows,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct VecSource {
        rows: Vec<Map<String, Value>>,
        fail: bool,
    }

    impl VecSource {
        fn with_rows(n: usize) -> Self {
            let rows = (0..n)
                .map(|i| {
                    let Value::Object(map) = json!({"id": i, "note": format!("row {i}")}) else {
                        unreachable!()
                    };
                    map
                })
                .collect();
            Self { rows, fail: false }
        }
    }

    impl RowSource for VecSource {
        async fn fetch_page(
            &self,
            _table: &str,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<Map<String, Value>>, ClientError> {
            if self.fail {
                return Err(ClientError::Api {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            Ok(self
                .rows
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct VecSink {
        batches: Mutex<Vec<usize>>,
        stored: Mutex<Vec<Map<String, Value>>>,
    }

    impl RowSink for VecSink {
        async fn store_batch(
            &self,
            _table: &str,
            rows: &[Map<String, Value>],
        ) -> Result<(), ClientError> {
            self.batches.lock().unwrap().push(rows.len());
            self.stored.lock().unwrap().extend(rows.iter().cloned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn copies_all_rows_across_pages() {
        let source = VecSource::with_rows(1_250);
        let sink = VecSink::default();

        let copy = copy_table(&source, &sink, "emotion_diaries", PAGE_SIZE)
            .await
            .unwrap();

        assert_eq!(copy.rows, 1_250);
        assert_eq!(copy.pages, 3);
        assert_eq!(*sink.batches.lock().unwrap(), vec![500, 500, 250]);
        assert_eq!(sink.stored.lock().unwrap().len(), 1_250);
    }

    #[tokio::test]
    async fn exact_page_multiple_stops_on_short_follow_up() {
        let source = VecSource::with_rows(1_000);
        let sink = VecSink::default();

        let copy = copy_table(&source, &sink, "profiles", PAGE_SIZE).await.unwrap();

        assert_eq!(copy.rows, 1_000);
        // The second page is full, so a third (empty) fetch confirms the end.
        assert_eq!(copy.pages, 2);
    }

    #[tokio::test]
    async fn empty_table_copies_nothing() {
        let source = VecSource::with_rows(0);
        let sink = VecSink::default();

        let copy = copy_table(&source, &sink, "post_categories", PAGE_SIZE)
            .await
            .unwrap();

        assert_eq!(copy.rows, 0);
        assert_eq!(copy.pages, 0);
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_names_the_table() {
        let source = VecSource {
            rows: Vec::new(),
            fail: true,
        };
        let sink = VecSink::default();

        let err = copy_table(&source, &sink, "risk_alerts", PAGE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("risk_alerts"));
    }
}
