//! Supabase project endpoint configuration.

use serde::{Deserialize, Serialize};

/// One Supabase project endpoint (source or target).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., `https://abcdefgh.supabase.co`).
    #[serde(default)]
    pub url: String,

    /// Service-role key. Grants full row access; never log it.
    #[serde(default)]
    pub service_role_key: String,
}

impl SupabaseConfig {
    /// Check that the endpoint has everything needed to build a client.
    ///
    /// The original scripts passed empty strings straight into client
    /// construction; mindsync refuses to.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.service_role_key.is_empty()
    }

    /// The project URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.strip_suffix('/').unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = SupabaseConfig::default();
        assert!(!config.is_configured());
    }

    #[test]
    fn configured_when_url_and_key_set() {
        let config = SupabaseConfig {
            url: "https://abcdefgh.supabase.co".into(),
            service_role_key: "service-role-key".into(),
        };
        assert!(config.is_configured());
    }

    #[test]
    fn url_alone_is_not_enough() {
        let config = SupabaseConfig {
            url: "https://abcdefgh.supabase.co".into(),
            service_role_key: String::new(),
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = SupabaseConfig {
            url: "https://abcdefgh.supabase.co/".into(),
            service_role_key: "k".into(),
        };
        assert_eq!(config.base_url(), "https://abcdefgh.supabase.co");
    }
}
