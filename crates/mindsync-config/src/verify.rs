//! Migration verifier configuration.

use serde::{Deserialize, Serialize};

/// Default number of content rows sampled for the CDN check.
const fn default_sample_size() -> usize {
    50
}

/// Default p99 latency ceiling in milliseconds.
const fn default_p99_threshold_ms() -> u64 {
    500
}

/// Default per-probe timeout in seconds.
const fn default_probe_timeout_secs() -> u64 {
    10
}

/// Default table holding CDN-served content.
fn default_content_table() -> String {
    "healing_contents".to_string()
}

/// Default column holding the asset URL.
fn default_thumbnail_column() -> String {
    "thumbnail_url".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifySettings {
    /// How many content rows to sample for CDN probing.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// p99 round-trip ceiling over all probe latencies, in milliseconds.
    #[serde(default = "default_p99_threshold_ms")]
    pub p99_threshold_ms: u64,

    /// Per-probe timeout in seconds. A timed-out probe still contributes
    /// its elapsed time to the latency set.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Table whose rows carry CDN asset URLs.
    #[serde(default = "default_content_table")]
    pub content_table: String,

    /// Column holding the asset URL within the content table.
    #[serde(default = "default_thumbnail_column")]
    pub thumbnail_column: String,

    /// Check every table and report all count mismatches at once instead of
    /// aborting on the first.
    #[serde(default)]
    pub accumulate: bool,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            p99_threshold_ms: default_p99_threshold_ms(),
            probe_timeout_secs: default_probe_timeout_secs(),
            content_table: default_content_table(),
            thumbnail_column: default_thumbnail_column(),
            accumulate: false,
        }
    }
}
