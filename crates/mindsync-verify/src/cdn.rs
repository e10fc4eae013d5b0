//! CDN availability and latency sampling.
//!
//! Samples thumbnail URLs off the target project's content rows, probes each
//! one, and gates on the 99th percentile over every recorded round-trip --
//! failed probes contribute their elapsed time too. With up to 50 samples
//! the p99 index lands on the slowest sample, so a single outlier fails the
//! check; that sensitivity is the point of the gate.

use std::time::{Duration, Instant};

use mindsync_core::p99;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::VerifyError;

/// Outcome of one URL probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the asset answered with a success status.
    pub ok: bool,
    /// Wall-clock round trip in milliseconds.
    pub latency_ms: u64,
}

/// Issues one lightweight existence probe per URL.
pub trait UrlProber {
    /// Probe `url`, reporting availability and round-trip time. Transport
    /// failures are an unavailable outcome, not an error.
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Probes assets over HTTP with a per-call timeout.
pub struct HttpProber {
    http: reqwest::Client,
}

impl HttpProber {
    /// Build a prober whose calls time out after `timeout`. A timed-out
    /// probe reports unavailable with its elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Client`] if the underlying client fails to
    /// build.
    pub fn new(timeout: Duration) -> Result<Self, VerifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(mindsync_client::ClientError::from)?;
        Ok(Self { http })
    }
}

impl UrlProber for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();
        let ok = match self.http.get(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(error) => {
                debug!(url, %error, "asset probe failed");
                false
            }
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        ProbeOutcome { ok, latency_ms }
    }
}

/// What the CDN check measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CdnReport {
    /// Probes issued.
    pub sampled: usize,
    /// Probes that answered with a success status.
    pub ok: usize,
    /// p99 over all recorded latencies; `None` when nothing was sampled.
    pub p99_ms: Option<u64>,
    /// True when there were no URLs to probe and the check was skipped.
    pub skipped: bool,
}

/// Pull the thumbnail URLs out of sampled content rows, skipping rows where
/// the column is absent, null, or empty.
#[must_use]
pub fn extract_urls(rows: &[Map<String, Value>], column: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get(column).and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Probe every URL sequentially and gate on the configured ceiling.
///
/// Pass requires p99 ≤ `threshold_ms` and at least one successful probe.
/// No URLs at all is an automatic pass (logged at warn level): an empty
/// sample set means there is nothing to measure, and data presence is the
/// count comparison's job.
///
/// # Errors
///
/// Returns [`VerifyError::CdnPerf`] when the gate fails.
pub async fn check_cdn<P: UrlProber>(
    prober: &P,
    urls: &[String],
    threshold_ms: u64,
) -> Result<CdnReport, VerifyError> {
    if urls.is_empty() {
        warn!("no thumbnail URLs to sample, skipping CDN check");
        return Ok(CdnReport {
            skipped: true,
            ..CdnReport::default()
        });
    }

    let mut latencies = Vec::with_capacity(urls.len());
    let mut ok = 0usize;
    for url in urls {
        let outcome = prober.probe(url).await;
        latencies.push(outcome.latency_ms);
        if outcome.ok {
            ok += 1;
        }
    }

    // Non-empty input, so the percentile exists.
    let p99_ms = p99(&latencies).unwrap_or(u64::MAX);
    let report = CdnReport {
        sampled: urls.len(),
        ok,
        p99_ms: Some(p99_ms),
        skipped: false,
    };

    if ok == 0 || p99_ms > threshold_ms {
        return Err(VerifyError::CdnPerf {
            p99_ms,
            threshold_ms,
            ok,
            sampled: urls.len(),
        });
    }

    info!(sampled = report.sampled, ok, p99_ms, "CDN check passed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Prober that replays scripted outcomes in order.
    struct ScriptedProber {
        outcomes: Mutex<std::vec::IntoIter<ProbeOutcome>>,
    }

    impl ScriptedProber {
        fn new(outcomes: Vec<ProbeOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter()),
            }
        }
    }

    impl UrlProber for ScriptedProber {
        async fn probe(&self, _url: &str) -> ProbeOutcome {
            self.outcomes
                .lock()
                .unwrap()
                .next()
                .expect("probe called more times than scripted")
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://cdn.example.com/thumbs/{i}.jpg"))
            .collect()
    }

    fn fast_ok(n: usize) -> Vec<ProbeOutcome> {
        vec![
            ProbeOutcome {
                ok: true,
                latency_ms: 120,
            };
            n
        ]
    }

    #[tokio::test]
    async fn all_fast_probes_pass() {
        let prober = ScriptedProber::new(fast_ok(50));
        let report = check_cdn(&prober, &urls(50), 500).await.unwrap();
        assert_eq!(report.sampled, 50);
        assert_eq!(report.ok, 50);
        assert_eq!(report.p99_ms, Some(120));
        assert!(!report.skipped);
    }

    #[tokio::test]
    async fn single_outlier_fails_fifty_samples() {
        // 49 fast probes and one 10s straggler: the p99 index lands on the
        // straggler, so the run fails despite 49/50 availability.
        let mut outcomes = fast_ok(49);
        outcomes.push(ProbeOutcome {
            ok: false,
            latency_ms: 10_000,
        });
        let prober = ScriptedProber::new(outcomes);

        let err = check_cdn(&prober, &urls(50), 500).await.unwrap_err();
        let VerifyError::CdnPerf { p99_ms, ok, sampled, .. } = err else {
            panic!("expected a cdn_perf failure");
        };
        assert_eq!(p99_ms, 10_000);
        assert_eq!(ok, 49);
        assert_eq!(sampled, 50);
    }

    #[tokio::test]
    async fn zero_successes_fail_even_when_fast() {
        let outcomes = vec![
            ProbeOutcome {
                ok: false,
                latency_ms: 10,
            };
            5
        ];
        let prober = ScriptedProber::new(outcomes);
        let err = check_cdn(&prober, &urls(5), 500).await.unwrap_err();
        assert!(err.to_string().starts_with("cdn_perf"));
    }

    #[tokio::test]
    async fn no_urls_is_a_skipped_pass() {
        let prober = ScriptedProber::new(Vec::new());
        let report = check_cdn(&prober, &[], 500).await.unwrap();
        assert!(report.skipped);
        assert_eq!(report.sampled, 0);
        assert_eq!(report.p99_ms, None);
    }

    #[tokio::test]
    async fn single_sample_is_its_own_p99() {
        let prober = ScriptedProber::new(vec![ProbeOutcome {
            ok: true,
            latency_ms: 480,
        }]);
        let report = check_cdn(&prober, &urls(1), 500).await.unwrap();
        assert_eq!(report.p99_ms, Some(480));
    }

    #[test]
    fn extract_urls_skips_absent_null_and_empty() {
        let rows: Vec<Map<String, Value>> = [
            json!({"id": 1, "thumbnail_url": "https://cdn.example.com/a.jpg"}),
            json!({"id": 2, "thumbnail_url": null}),
            json!({"id": 3}),
            json!({"id": 4, "thumbnail_url": ""}),
            json!({"id": 5, "thumbnail_url": "https://cdn.example.com/b.jpg"}),
        ]
        .into_iter()
        .map(|v| {
            let Value::Object(map) = v else { unreachable!() };
            map
        })
        .collect();

        assert_eq!(
            extract_urls(&rows, "thumbnail_url"),
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
            ]
        );
    }
}
