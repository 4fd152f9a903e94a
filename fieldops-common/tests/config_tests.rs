//! Configuration loading and resolution priority tests
//!
//! Tests that manipulate FIELDOPS_* environment variables are marked with
//! #[serial] so they never race each other.

use fieldops_common::config::{
    init_config, load_config, load_toml_config, resolve_api_settings, write_toml_config, TomlConfig,
    API_TOKEN_ENV_VAR, API_URL_ENV_VAR, CONFIG_ENV_VAR,
};
use fieldops_common::Error;
use serial_test::serial;
use std::env;
use std::time::Duration;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(API_URL_ENV_VAR);
    env::remove_var(API_TOKEN_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_beats_env_beats_toml() {
    clear_env();
    let config = TomlConfig {
        api_base_url: Some("https://toml.example/api".to_string()),
        api_token: Some("toml-token".to_string()),
        ..Default::default()
    };

    // TOML only
    let settings = resolve_api_settings(None, None, &config).unwrap();
    assert_eq!(settings.base_url, "https://toml.example/api");
    assert_eq!(settings.token.as_deref(), Some("toml-token"));

    // ENV overrides TOML
    env::set_var(API_URL_ENV_VAR, "https://env.example/api/");
    let settings = resolve_api_settings(None, None, &config).unwrap();
    assert_eq!(settings.base_url, "https://env.example/api", "trailing slash trimmed");
    assert_eq!(settings.token.as_deref(), Some("toml-token"));

    // CLI overrides ENV
    let settings =
        resolve_api_settings(Some("https://cli.example/api"), Some("cli-token"), &config).unwrap();
    assert_eq!(settings.base_url, "https://cli.example/api");
    assert_eq!(settings.token.as_deref(), Some("cli-token"));

    clear_env();
}

#[test]
#[serial]
fn test_missing_base_url_is_config_error() {
    clear_env();
    let result = resolve_api_settings(None, None, &TomlConfig::default());
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains(API_URL_ENV_VAR)),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_blank_values_are_ignored() {
    clear_env();
    env::set_var(API_URL_ENV_VAR, "   ");
    let config = TomlConfig {
        api_base_url: Some("https://toml.example/api".to_string()),
        ..Default::default()
    };
    let settings = resolve_api_settings(Some(""), None, &config).unwrap();
    assert_eq!(settings.base_url, "https://toml.example/api");
    assert_eq!(settings.token, None);
    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_falls_back_to_default() {
    clear_env();
    let config = TomlConfig {
        api_base_url: Some("https://toml.example/api".to_string()),
        request_timeout_secs: 0,
        ..Default::default()
    };
    let settings = resolve_api_settings(None, None, &config).unwrap();
    assert_eq!(settings.timeout, Duration::from_secs(30));
}

#[test]
fn test_write_then_load_preserves_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.api_base_url = Some("https://bo.example/api".to_string());
    config.media.resize_percent = Some(50);
    config.ledger.write_concurrency = 2;

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_init_config_refuses_to_overwrite_without_force() {
    // Given: an existing config file
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();

    let mut config = TomlConfig::default();
    config.api_base_url = Some("https://bo.example/api".to_string());

    // When: initialising without overwrite
    let result = init_config(&config, &path, false);

    // Then: it is a config error and the file is untouched
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("--force")));
    assert_eq!(load_toml_config(&path).unwrap().request_timeout_secs, 5);

    // When: forcing
    init_config(&config, &path, true).unwrap();

    // Then: the new values are on disk
    assert_eq!(load_toml_config(&path).unwrap(), config);
}

#[test]
fn test_init_config_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fieldops").join("config.toml");

    init_config(&TomlConfig::default(), &path, false).unwrap();

    assert_eq!(load_toml_config(&path).unwrap(), TomlConfig::default());
}

#[test]
fn test_malformed_toml_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_base_url = [not toml").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_config_path_missing_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(CONFIG_ENV_VAR, dir.path().join("absent.toml"));

    let config = load_config(None).unwrap();
    assert_eq!(config, TomlConfig::default());

    clear_env();
}

#[test]
#[serial]
fn test_env_config_path_is_loaded() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "request_timeout_secs = 12\n[logging]\nlevel = \"debug\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config(None).unwrap();
    assert_eq!(config.request_timeout_secs, 12);
    assert_eq!(config.logging.level, "debug");

    clear_env();
}
