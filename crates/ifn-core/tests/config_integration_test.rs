//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use ifn_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig, DEFAULT_AUTH_URL};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: [&str; 7] = [
    "IFN_API_URL",
    "IFN_AUTH_URL",
    "IFN_REQUEST_TIMEOUT_SECS",
    "IFN_FOCUS_ZOOM",
    "IFN_ANIMATION_MS",
    "IFN_ACCESS_TOKEN",
    "IFN_EMAIL",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_url = "https://brigadas.example"
# Only override the API URL, leave others as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.api_url.value, "https://brigadas.example");
    assert_eq!(config.api_url.source, ConfigSource::File);
    assert_eq!(config.auth_url.value, DEFAULT_AUTH_URL);
    assert_eq!(config.auth_url.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("IFN_API_URL", "http://env-api:3000");
    env::set_var("IFN_ANIMATION_MS", "900");
    env::set_var("IFN_ACCESS_TOKEN", "env-token");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_url = "http://file-api:3000"
animation_ms = 2000
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.api_url.value, "http://env-api:3000");
    assert_eq!(config.api_url.source, ConfigSource::Environment);
    assert_eq!(config.animation_ms.value, 900);
    assert_eq!(config.access_token.value.as_deref(), Some("env-token"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("IFN_FOCUS_ZOOM", "very close");
    env::set_var("IFN_API_URL", "not-a-url");
    env::set_var("IFN_REQUEST_TIMEOUT_SECS", "-3");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.focus_zoom.source, ConfigSource::Default);
    assert_eq!(config.api_url.source, ConfigSource::Default);
    assert_eq!(config.request_timeout_secs.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_blank_token_in_environment_is_ignored() {
    clear_env();
    env::set_var("IFN_ACCESS_TOKEN", "   ");

    let config = LayeredConfig::with_defaults().load_from_env();
    assert!(config.access_token.value.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var("IFN_EMAIL", "env@ifn.example");
    env::set_var("IFN_ACCESS_TOKEN", "env-token");

    let mut config = LayeredConfig::with_defaults().load_from_env();

    config.update_from_cli(CliConfigOverrides {
        email: Some("cli@ifn.example".to_string()),
        access_token: Some("cli-token".to_string()),
        ..Default::default()
    });

    assert_eq!(config.email.value.as_deref(), Some("cli@ifn.example"));
    assert_eq!(config.email.source, ConfigSource::Cli);
    assert_eq!(config.access_token.value.as_deref(), Some("cli-token"));
    assert_eq!(config.access_token.source, ConfigSource::Cli);

    clear_env();
}

#[test]
fn test_missing_file_is_config_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/ifn.toml");
    assert!(result.is_err());
}
