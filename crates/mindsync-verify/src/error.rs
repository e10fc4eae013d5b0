//! Verifier error types.
//!
//! The error taxonomy strings (`count_mismatch:<table>:<src>:<dst>`,
//! `cdn_perf`) are load-bearing: operators and the migration runbook grep
//! for them, so the `Display` impls keep the exact prefixes.

use std::fmt;

use thiserror::Error;

/// One table whose source and target counts disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    /// Table the counts disagree on.
    pub table: String,
    /// Row count on the source project.
    pub source_count: u64,
    /// Row count on the target project.
    pub target_count: u64,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count_mismatch:{}:{}:{}",
            self.table, self.source_count, self.target_count
        )
    }
}

/// Errors that fail a verification run.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A table's row counts disagree (fail-fast mode: the first one found).
    #[error("{0}")]
    CountMismatch(CountMismatch),

    /// Multiple tables disagree (accumulate mode).
    #[error("{}", format_mismatches(.0))]
    CountMismatches(Vec<CountMismatch>),

    /// The sampled CDN latency or availability missed the bar.
    #[error(
        "cdn_perf: p99 {p99_ms}ms over {sampled} samples (threshold {threshold_ms}ms, {ok} probes ok)"
    )]
    CdnPerf {
        /// Computed 99th percentile over all recorded latencies.
        p99_ms: u64,
        /// Configured ceiling.
        threshold_ms: u64,
        /// Successful probes.
        ok: usize,
        /// Total probes issued.
        sampled: usize,
    },

    /// A count query or sample fetch failed outright.
    #[error("client error: {0}")]
    Client(#[from] mindsync_client::ClientError),
}

fn format_mismatches(mismatches: &[CountMismatch]) -> String {
    let parts: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_renders_the_taxonomy_string() {
        let err = VerifyError::CountMismatch(CountMismatch {
            table: "risk_alerts".into(),
            source_count: 45,
            target_count: 44,
        });
        assert_eq!(err.to_string(), "count_mismatch:risk_alerts:45:44");
    }

    #[test]
    fn accumulated_mismatches_join_with_semicolons() {
        let err = VerifyError::CountMismatches(vec![
            CountMismatch {
                table: "profiles".into(),
                source_count: 120,
                target_count: 119,
            },
            CountMismatch {
                table: "post_likes".into(),
                source_count: 7,
                target_count: 0,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "count_mismatch:profiles:120:119; count_mismatch:post_likes:7:0"
        );
    }

    #[test]
    fn cdn_error_starts_with_the_taxonomy_prefix() {
        let err = VerifyError::CdnPerf {
            p99_ms: 10_000,
            threshold_ms: 500,
            ok: 48,
            sampled: 50,
        };
        assert!(err.to_string().starts_with("cdn_perf"));
    }
}
