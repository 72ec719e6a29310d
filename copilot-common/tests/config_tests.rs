//! Tests for configuration loading from the environment and TOML files
//!
//! Uses serial_test: these tests set process environment variables.

use copilot_common::config::{
    AppConfig, CliOverrides, VoiceProvider, ENV_CONFIG_PATH, ENV_DATABASE_URL, ENV_OPENAI_API_KEY,
    ENV_RETELL_API_KEY, ENV_VOICE_PROVIDER,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

const VARS: &[&str] = &[
    ENV_CONFIG_PATH,
    ENV_DATABASE_URL,
    ENV_OPENAI_API_KEY,
    ENV_RETELL_API_KEY,
    ENV_VOICE_PROVIDER,
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "RETELL_AGENT_ID",
    "RETELL_FROM_NUMBER",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_from_explicit_config_file() {
    clear_env();
    let file = write_config(
        r#"
        [server]
        host = "0.0.0.0"
        port = 6000

        [database]
        url = "sqlite:///tmp/copilot-config-test.db"

        [ai]
        enrichment_placeholder = true

        [voice]
        provider = "retell"
        agent_id = "agent-123"
        from_number = "+15550100"

        [logging]
        level = "debug"
        "#,
    );

    let cli = CliOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = AppConfig::load(&cli).unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 6000);
    assert_eq!(config.database_url, "sqlite:///tmp/copilot-config-test.db");
    assert!(config.ai.enrichment_placeholder);
    assert_eq!(config.voice.provider, VoiceProvider::Retell);
    assert_eq!(config.voice.agent_id.as_deref(), Some("agent-123"));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.config_file, Some(file.path().to_path_buf()));
}

#[test]
#[serial]
fn test_env_takes_precedence_over_toml() {
    clear_env();
    let file = write_config(
        r#"
        [ai]
        api_key = "toml-openai-key"

        [voice]
        api_key = "toml-retell-key"
        provider = "retell"
        "#,
    );

    env::set_var(ENV_CONFIG_PATH, file.path());
    env::set_var(ENV_OPENAI_API_KEY, "env-openai-key");
    env::set_var(ENV_VOICE_PROVIDER, "mock");

    let config = AppConfig::load(&CliOverrides::default()).unwrap();

    assert_eq!(config.ai.api_key.as_deref(), Some("env-openai-key"));
    assert_eq!(config.voice.api_key.as_deref(), Some("toml-retell-key"));
    assert_eq!(config.voice.provider, VoiceProvider::Mock);

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_config_file_is_an_error() {
    clear_env();
    let cli = CliOverrides {
        config_path: Some(PathBuf::from("/nonexistent/sales-copilot/config.toml")),
        ..Default::default()
    };
    assert!(AppConfig::load(&cli).is_err());
}

#[test]
#[serial]
fn test_malformed_config_file_is_an_error() {
    clear_env();
    let file = write_config("[server\nport = \"not a number\"");
    env::set_var(ENV_CONFIG_PATH, file.path());

    assert!(AppConfig::load(&CliOverrides::default()).is_err());

    clear_env();
}

#[test]
#[serial]
fn test_database_url_from_env() {
    clear_env();
    env::set_var(ENV_DATABASE_URL, "sqlite::memory:");

    let file = write_config("");
    let cli = CliOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = AppConfig::load(&cli).unwrap();

    assert_eq!(config.database_url, "sqlite::memory:");
    assert!(config.ai.api_key.is_none());

    clear_env();
}
