//! # mindsync-config
//!
//! Layered configuration loading for mindsync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Legacy migration environment variables (`MIGRATE_SOURCE_SUPABASE_URL`,
//!    `MIGRATE_SOURCE_SERVICE_ROLE_KEY`, `MIGRATE_TARGET_SUPABASE_URL`,
//!    `MIGRATE_TARGET_SERVICE_ROLE_KEY`) -- exactly the names the original
//!    migration scripts consumed
//! 2. Environment variables (`MINDSYNC_*` prefix, `__` as separator)
//! 3. Project-level `.mindsync/config.toml`
//! 4. User-level `~/.config/mindsync/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MINDSYNC_SOURCE__URL` -> `source.url`,
//! `MINDSYNC_VERIFY__SAMPLE_SIZE` -> `verify.sample_size`, etc. The `__`
//! (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use mindsync_config::MindsyncConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = MindsyncConfig::load_with_dotenv().expect("config");
//!
//! // Refuse to run against unconfigured endpoints:
//! config.require_endpoints().expect("source and target configured");
//! ```

mod error;
mod relay;
mod supabase;
mod verify;

pub use error::ConfigError;
pub use relay::RelayConfig;
pub use supabase::SupabaseConfig;
pub use verify::VerifySettings;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable the original scripts used for the source URL.
pub const LEGACY_SOURCE_URL: &str = "MIGRATE_SOURCE_SUPABASE_URL";
/// Environment variable the original scripts used for the source key.
pub const LEGACY_SOURCE_KEY: &str = "MIGRATE_SOURCE_SERVICE_ROLE_KEY";
/// Environment variable the original scripts used for the target URL.
pub const LEGACY_TARGET_URL: &str = "MIGRATE_TARGET_SUPABASE_URL";
/// Environment variable the original scripts used for the target key.
pub const LEGACY_TARGET_KEY: &str = "MIGRATE_TARGET_SERVICE_ROLE_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MindsyncConfig {
    /// Project the change feed and counts are read from.
    #[serde(default)]
    pub source: SupabaseConfig,
    /// Project mutations and counts are applied to.
    #[serde(default)]
    pub target: SupabaseConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub verify: VerifySettings,
}

impl MindsyncConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when figment extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: Self = Self::figment().extract().map_err(ConfigError::from)?;
        config.apply_legacy_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when figment extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top. The legacy `MIGRATE_*` variables are
    /// applied after extraction, not here -- they predate the nested naming
    /// scheme and cannot be expressed as a prefix mapping.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".mindsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables
        figment = figment.merge(Env::prefixed("MINDSYNC_").split("__"));

        figment
    }

    /// Overlay the four legacy migration variables on top of whatever the
    /// figment chain produced. Empty values are ignored -- the original
    /// scripts forwarded them silently; mindsync treats empty as unset.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overlay = |name: &str, slot: &mut String| {
            if let Some(value) = lookup(name) {
                if !value.is_empty() {
                    *slot = value;
                }
            }
        };
        overlay(LEGACY_SOURCE_URL, &mut self.source.url);
        overlay(LEGACY_SOURCE_KEY, &mut self.source.service_role_key);
        overlay(LEGACY_TARGET_URL, &mut self.target.url);
        overlay(LEGACY_TARGET_KEY, &mut self.target.service_role_key);
    }

    /// Check that both endpoints are fully configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] naming the first incomplete
    /// section.
    pub fn require_endpoints(&self) -> Result<(), ConfigError> {
        if !self.source.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "source".to_string(),
            });
        }
        if !self.target.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "target".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mindsync").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}
