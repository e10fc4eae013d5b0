//! Integration tests for environment-variable layering, including the four
//! legacy `MIGRATE_*` variables the original migration scripts consumed.

use figment::Jail;
use mindsync_config::MindsyncConfig;

#[test]
fn mindsync_env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("MINDSYNC_SOURCE__URL", "https://src.supabase.co");
        jail.set_env("MINDSYNC_SOURCE__SERVICE_ROLE_KEY", "src-key");
        jail.set_env("MINDSYNC_TARGET__URL", "https://dst.supabase.co");
        jail.set_env("MINDSYNC_TARGET__SERVICE_ROLE_KEY", "dst-key");
        jail.set_env("MINDSYNC_VERIFY__SAMPLE_SIZE", "10");

        let config = MindsyncConfig::load().expect("config loads");
        assert!(config.require_endpoints().is_ok());
        assert_eq!(config.source.url, "https://src.supabase.co");
        assert_eq!(config.target.url, "https://dst.supabase.co");
        assert_eq!(config.verify.sample_size, 10);
        Ok(())
    });
}

#[test]
fn legacy_migrate_vars_fill_endpoints() {
    Jail::expect_with(|jail| {
        jail.set_env("MIGRATE_SOURCE_SUPABASE_URL", "https://legacy-src.supabase.co");
        jail.set_env("MIGRATE_SOURCE_SERVICE_ROLE_KEY", "legacy-src-key");
        jail.set_env("MIGRATE_TARGET_SUPABASE_URL", "https://legacy-dst.supabase.co");
        jail.set_env("MIGRATE_TARGET_SERVICE_ROLE_KEY", "legacy-dst-key");

        let config = MindsyncConfig::load().expect("config loads");
        assert!(config.require_endpoints().is_ok());
        assert_eq!(config.source.url, "https://legacy-src.supabase.co");
        assert_eq!(config.source.service_role_key, "legacy-src-key");
        assert_eq!(config.target.url, "https://legacy-dst.supabase.co");
        assert_eq!(config.target.service_role_key, "legacy-dst-key");
        Ok(())
    });
}

#[test]
fn legacy_vars_beat_mindsync_vars() {
    Jail::expect_with(|jail| {
        jail.set_env("MINDSYNC_SOURCE__URL", "https://nested.supabase.co");
        jail.set_env("MIGRATE_SOURCE_SUPABASE_URL", "https://legacy.supabase.co");

        let config = MindsyncConfig::load().expect("config loads");
        assert_eq!(config.source.url, "https://legacy.supabase.co");
        Ok(())
    });
}

#[test]
fn empty_legacy_var_does_not_clobber() {
    Jail::expect_with(|jail| {
        jail.set_env("MINDSYNC_SOURCE__URL", "https://nested.supabase.co");
        jail.set_env("MIGRATE_SOURCE_SUPABASE_URL", "");

        let config = MindsyncConfig::load().expect("config loads");
        assert_eq!(config.source.url, "https://nested.supabase.co");
        Ok(())
    });
}
