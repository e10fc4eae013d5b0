//! # mindsync-verify
//!
//! The migration verifier: after a bulk copy, confirms that every replicated
//! table has matching row counts on the source and target projects, then
//! samples target-hosted thumbnail assets for availability and p99 latency.
//!
//! The run is strictly sequential and one-shot. Any failed invariant aborts
//! with an error whose text carries the operator-facing taxonomy
//! (`count_mismatch:<table>:<src>:<dst>`, `cdn_perf`); the CLI maps success
//! to a literal `verified` line and exit code 0.

mod cdn;
mod counts;
mod error;

pub use cdn::{CdnReport, HttpProber, ProbeOutcome, UrlProber, check_cdn, extract_urls};
pub use counts::{CountCheck, CountSource, compare_counts};
pub use error::{CountMismatch, VerifyError};

use std::time::Duration;

use chrono::{DateTime, Utc};
use mindsync_client::SupabaseClient;
use mindsync_config::MindsyncConfig;
use mindsync_core::REPLICATED_TABLES;

/// Everything a successful verification measured.
#[derive(Debug)]
pub struct VerifyReport {
    /// Per-table count pairs, in registry order.
    pub checks: Vec<CountCheck>,
    /// CDN sampling outcome.
    pub cdn: CdnReport,
    /// When the run finished.
    pub verified_at: DateTime<Utc>,
}

/// Run the full verification: counts for every replicated table, then the
/// CDN sample against the target's content table.
///
/// # Errors
///
/// Returns [`VerifyError`] on the first failed invariant (or the collected
/// set in accumulate mode), or on any client failure.
pub async fn run_verify(config: &MindsyncConfig) -> Result<VerifyReport, VerifyError> {
    let source = SupabaseClient::new(&config.source)?;
    let target = SupabaseClient::new(&config.target)?;
    let settings = &config.verify;

    let checks = compare_counts(&source, &target, &REPLICATED_TABLES, settings.accumulate).await?;

    let rows = target
        .select_page(&settings.content_table, 0, settings.sample_size)
        .await?;
    let urls = extract_urls(&rows, &settings.thumbnail_column);
    let prober = HttpProber::new(Duration::from_secs(settings.probe_timeout_secs))?;
    let cdn = check_cdn(&prober, &urls, settings.p99_threshold_ms).await?;

    Ok(VerifyReport {
        checks,
        cdn,
        verified_at: Utc::now(),
    })
}
