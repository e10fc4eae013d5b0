//! PostgREST row operations.
//!
//! One client per project endpoint, holding the service-role key in default
//! headers. Every method issues exactly one HTTP call; retry policy belongs
//! to the caller.

use std::time::Duration;

use mindsync_config::SupabaseConfig;
use mindsync_core::RowId;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue, RANGE};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::http::{check_response, parse_content_range};

/// Per-request timeout for row operations and count probes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one Supabase project's REST surface.
#[derive(Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    /// Build a client for a configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an unconfigured endpoint or a key
    /// that cannot be carried in a header, [`ClientError::Http`] if the
    /// underlying client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, ClientError> {
        if !config.is_configured() {
            return Err(ClientError::Config(
                "endpoint URL and service-role key must both be set".to_string(),
            ));
        }

        let mut api_key = HeaderValue::from_str(&config.service_role_key)
            .map_err(|_| ClientError::Config("service-role key is not header-safe".to_string()))?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))
            .map_err(|_| ClientError::Config("service-role key is not header-safe".to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
        })
    }

    /// Exact row count for `table`, without materializing rows.
    ///
    /// Issues a single-row probe with `Prefer: count=exact` and reads the
    /// total off the `Content-Range` trailer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or a
    /// missing/unusable `Content-Range` header.
    pub async fn count(&self, table: &str) -> Result<u64, ClientError> {
        let resp = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .header(RANGE, "0-0")
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ClientError::ContentRange("header absent".to_string()))?;
        let total = parse_content_range(range)?;
        debug!(table, total, "counted rows");
        Ok(total)
    }

    /// Insert one full row image. No conflict handling: a duplicate
    /// identifier surfaces as [`ClientError::Api`] from PostgREST.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-success status.
    pub async fn insert(&self, table: &str, row: &Map<String, Value>) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check_response(resp).await?;
        debug!(table, "inserted row");
        Ok(())
    }

    /// Overwrite the row matching `id` with the full new row image.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-success status.
    pub async fn update(
        &self,
        table: &str,
        id: &RowId,
        row: &Map<String, Value>,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check_response(resp).await?;
        debug!(table, %id, "updated row");
        Ok(())
    }

    /// Delete the row matching `id`. Deleting an absent row is a no-op, so a
    /// repeated delete is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-success status.
    pub async fn delete(&self, table: &str, id: &RowId) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        check_response(resp).await?;
        debug!(table, %id, "deleted row");
        Ok(())
    }

    /// Upsert a batch of rows, merging on the primary key (bulk copy path).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-success status.
    pub async fn upsert_batch(
        &self,
        table: &str,
        rows: &[Map<String, Value>],
    ) -> Result<(), ClientError> {
        if rows.is_empty() {
            return Ok(());
        }
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        check_response(resp).await?;
        debug!(table, rows = rows.len(), "upserted batch");
        Ok(())
    }

    /// Fetch one page of rows ordered by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or a
    /// response body that is not an array of row objects.
    pub async fn select_page(
        &self,
        table: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Map<String, Value>>, ClientError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let resp = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", "id.asc")])
            .header(RANGE, format!("{offset}-{}", offset + limit - 1))
            .send()
            .await?;
        let resp = check_response(resp).await?;
        Ok(resp.json().await?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use mindsync_config::SupabaseConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    fn endpoint() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://abcdefgh.supabase.co/".into(),
            service_role_key: "service-role-key".into(),
        }
    }

    #[test]
    fn refuses_unconfigured_endpoint() {
        let err = SupabaseClient::new(&SupabaseConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn refuses_non_header_safe_key() {
        let config = SupabaseConfig {
            url: "https://abcdefgh.supabase.co".into(),
            service_role_key: "bad\nkey".into(),
        };
        assert!(matches!(
            SupabaseClient::new(&config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn table_url_has_no_double_slash() {
        let client = SupabaseClient::new(&endpoint()).unwrap();
        assert_eq!(
            client.table_url("profiles"),
            "https://abcdefgh.supabase.co/rest/v1/profiles"
        );
    }
}
