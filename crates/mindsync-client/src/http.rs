//! Shared HTTP response helpers for the REST client.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`ClientError::Api`]) so the row-operation methods
//! stay focused on request construction and response mapping.

use crate::error::ClientError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`ClientError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`ClientError::Api`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(ClientError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(ClientError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Parse the total row count out of a `Content-Range` value.
///
/// PostgREST answers exact-count probes with `0-0/123` (or `*/0` for an
/// empty table); the total is everything after the `/`.
pub fn parse_content_range(value: &str) -> Result<u64, ClientError> {
    let total = value
        .rsplit_once('/')
        .map(|(_, total)| total)
        .ok_or_else(|| ClientError::ContentRange(value.to_string()))?;
    total
        .parse::<u64>()
        .map_err(|_| ClientError::ContentRange(value.to_string()))
}
