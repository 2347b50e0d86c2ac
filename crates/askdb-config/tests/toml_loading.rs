//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use askdb_config::AskConfig;
use pretty_assertions::assert_eq;
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};

#[test]
fn loads_oracle_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[oracle]
api_key = "sk-toml"
base_url = "https://llm.example.test/v1"
model = "qwen3-max"
temperature = 0.3
max_tokens = 2000
context_window = 5
"#,
        )?;

        let config: AskConfig = Figment::from(Serialized::defaults(AskConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.oracle.api_key, "sk-toml");
        assert_eq!(config.oracle.model, "qwen3-max");
        assert_eq!(config.oracle.max_tokens, 2000);
        assert_eq!(config.oracle.context_window, 5);
        assert!(config.oracle.is_configured());
        Ok(())
    });
}

#[test]
fn partial_sections_keep_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
user = "reader"
port = 3307

[training]
history_capacity = 20
"#,
        )?;

        let config: AskConfig = Figment::from(Serialized::defaults(AskConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.user, "reader");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.charset, "utf8mb4");
        assert_eq!(config.training.history_capacity, 20);
        assert_eq!(config.training.preview_chars, 100);
        assert!(config.routing.auto_limit);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[oracle]
model = "from-toml"
"#,
        )?;
        jail.set_env("ASKDB_ORACLE__MODEL", "from-env");
        jail.set_env("ASKDB_ROUTING__RESULT_LIMIT", "25");

        let config: AskConfig = Figment::from(Serialized::defaults(AskConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("ASKDB_").split("__"))
            .extract()?;

        assert_eq!(config.oracle.model, "from-env");
        assert_eq!(config.routing.result_limit, 25);
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".askdb")?;
        jail.create_file(
            ".askdb/config.toml",
            r#"
[database]
default_host = "10.0.0.5"
"#,
        )?;

        let config = AskConfig::load().expect("config loads");
        assert_eq!(config.database.default_host, "10.0.0.5");
        Ok(())
    });
}

#[test]
fn load_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.set_env("ASKDB_TRAINING__HISTORY_CAPACITY", "0");
        assert!(AskConfig::load().is_err());
        Ok(())
    });
}
