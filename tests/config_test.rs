//! Tests for loading client configuration from disk and environment.

use std::collections::HashMap;
use std::time::Duration;

use godpanel::config::DEFAULT_BASE_URL;
use godpanel::{ClientConfig, PanelError};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[api]
base_url = "https://panel.example.com/api"
timeout_ms = 2500
log_requests = true
login_route = "/signin"

[api.headers]
X-Tenant = "acme"

[retry]
max_retries = 5
base_delay_ms = 250
multiplier = 3
statuses = [503]

[cache]
ttl_secs = 30
max_entries = 10
"#;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, FULL_CONFIG);

    let config = ClientConfig::load(Some(path.as_path())).unwrap();

    assert_eq!(config.base_url, "https://panel.example.com/api");
    assert_eq!(config.timeout, Duration::from_millis(2500));
    assert!(config.log_requests);
    assert_eq!(config.login_route, "/signin");
    assert_eq!(config.headers, vec![("X-Tenant".to_string(), "acme".to_string())]);
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.base_delay, Duration::from_millis(250));
    assert_eq!(config.retry.multiplier, 3);
    assert_eq!(config.retry.retry_statuses, vec![503]);
    assert_eq!(config.cache.ttl, Duration::from_secs(30));
    assert_eq!(config.cache.max_entries, 10);
}

#[test]
fn partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[cache]\nttl_secs = 5\n");

    let config = ClientConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.cache.ttl, Duration::from_secs(5));
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.retry, ClientConfig::default().retry);
}

#[test]
fn malformed_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[api\nbase_url = ");

    let err = ClientConfig::load(Some(path.as_path())).unwrap_err();
    match err {
        PanelError::Configuration(msg) => assert!(msg.contains("config.toml"), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ClientConfig::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(matches!(err, PanelError::Configuration(_)));
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, FULL_CONFIG);
    let env: HashMap<&str, &str> = HashMap::from([
        ("NUXT_PUBLIC_API_URL", "http://staging.local:4000"),
        ("API_TIMEOUT", "15000"),
        ("ENABLE_API_LOGGING", "false"),
    ]);

    let config = ClientConfig::load(Some(path.as_path()))
        .unwrap()
        .apply_env_with(|name| env.get(name).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(config.base_url, "http://staging.local:4000");
    assert_eq!(config.timeout, Duration::from_secs(15));
    assert!(!config.log_requests);
    // Untouched by the environment.
    assert_eq!(config.retry.max_retries, 5);
}
