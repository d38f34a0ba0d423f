//! Environment variables override TOML layers.

use figment::Jail;
use trawl_config::{ConfigError, TrawlConfig};

#[test]
fn env_var_sets_nested_field() {
    Jail::expect_with(|jail| {
        jail.set_env("TRAWL_SEARCH__PER_SOURCE_CAP", "40");
        jail.set_env("TRAWL_UPSTREAM__MAX_ATTEMPTS", "1");

        let config = TrawlConfig::load().expect("config loads");
        assert_eq!(config.search.per_source_cap, 40);
        assert_eq!(config.upstream.max_attempts, 1);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".trawl")?;
        jail.create_file(
            ".trawl/config.toml",
            r#"
[search]
per_source_timeout_ms = 3000
"#,
        )?;
        jail.set_env("TRAWL_SEARCH__PER_SOURCE_TIMEOUT_MS", "1500");

        let config = TrawlConfig::load().expect("config loads");
        assert_eq!(config.search.per_source_timeout_ms, 1500);
        Ok(())
    });
}

#[test]
fn unknown_backend_from_env_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("TRAWL_SHARED__BACKEND", "redis");

        let config = TrawlConfig::load().expect("config loads");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedBackend(_))
        ));
        Ok(())
    });
}

#[test]
fn malformed_value_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.set_env("TRAWL_SEARCH__PER_SOURCE_CAP", "lots");

        let err = TrawlConfig::load().expect_err("should fail");
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
