//! Per-table row-count comparison.

use mindsync_client::{ClientError, SupabaseClient};
use tracing::{debug, info};

use crate::error::{CountMismatch, VerifyError};

/// One table's verified count pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountCheck {
    /// Table that was counted.
    pub table: String,
    /// Row count on the source project.
    pub source_count: u64,
    /// Row count on the target project.
    pub target_count: u64,
}

impl CountCheck {
    /// Whether both sides agree.
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.source_count == self.target_count
    }
}

/// Exact row counts for the comparison.
pub trait CountSource {
    /// Count rows in `table` without materializing them.
    fn count(&self, table: &str) -> impl Future<Output = Result<u64, ClientError>> + Send;
}

impl CountSource for SupabaseClient {
    fn count(&self, table: &str) -> impl Future<Output = Result<u64, ClientError>> + Send {
        Self::count(self, table)
    }
}

/// Compare row counts for every table, one pair of count queries per table.
///
/// Fail-fast by default: the first mismatch aborts the walk and later tables
/// are never counted. With `accumulate`, every table is counted and all
/// mismatches are reported together.
///
/// # Errors
///
/// [`VerifyError::CountMismatch`] / [`VerifyError::CountMismatches`] on
/// disagreement, [`VerifyError::Client`] if a count query fails.
pub async fn compare_counts<S, T>(
    source: &S,
    target: &T,
    tables: &[&str],
    accumulate: bool,
) -> Result<Vec<CountCheck>, VerifyError>
where
    S: CountSource,
    T: CountSource,
{
    let mut checks = Vec::with_capacity(tables.len());
    let mut mismatches = Vec::new();

    for &table in tables {
        let source_count = source.count(table).await?;
        let target_count = target.count(table).await?;
        let check = CountCheck {
            table: table.to_string(),
            source_count,
            target_count,
        };
        debug!(table, source_count, target_count, "compared counts");

        if !check.matches() {
            let mismatch = CountMismatch {
                table: check.table.clone(),
                source_count,
                target_count,
            };
            if !accumulate {
                return Err(VerifyError::CountMismatch(mismatch));
            }
            mismatches.push(mismatch);
        }
        checks.push(check);
    }

    if !mismatches.is_empty() {
        return Err(VerifyError::CountMismatches(mismatches));
    }

    info!(tables = tables.len(), "row counts match");
    Ok(checks)
}
