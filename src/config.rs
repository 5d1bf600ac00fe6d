//! Client configuration.
//!
//! [`ClientConfig`] is built in code, read from the environment, or loaded
//! from TOML. File resolution order:
//! 1. explicit path (CLI `--config`), which must exist
//! 2. `~/.godpanel/config.toml`
//! 3. built-in defaults
//!
//! Environment variables override whatever the file set:
//! `NUXT_PUBLIC_API_URL` (or `API_URL`), `API_TIMEOUT` in milliseconds and
//! `ENABLE_API_LOGGING`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::client::RetryPolicy;
use crate::platform::DEFAULT_LOGIN_ROUTE;
use crate::{PanelError, Result};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the client needs to know about its backend.
///
/// ```rust
/// # use godpanel::ClientConfig;
/// # use std::time::Duration;
/// let config = ClientConfig::new()
///     .base_url("https://panel.example.com/api")
///     .timeout(Duration::from_secs(5))
///     .header("X-Tenant", "acme")
///     .log_requests(true);
/// assert_eq!(config.login_route, "/auth/login");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra default headers sent with every request.
    pub headers: Vec<(String, String)>,
    pub retry: RetryPolicy,
    pub cache: CacheConfig,
    /// Log every request and response at `debug`.
    pub log_requests: bool,
    /// Route the navigator is sent to on 401.
    pub login_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
            log_requests: false,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Override fields from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Override fields from the variables `lookup` resolves.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("NUXT_PUBLIC_API_URL").or_else(|| lookup("API_URL")) {
            self.base_url = url;
        }
        if let Some(raw) = lookup("API_TIMEOUT") {
            let millis: u64 = raw.trim().parse().map_err(|e| {
                PanelError::Configuration(format!("invalid API_TIMEOUT {raw:?}: {e}"))
            })?;
            self.timeout = Duration::from_millis(millis);
        }
        if let Some(flag) = lookup("ENABLE_API_LOGGING") {
            self.log_requests = matches!(flag.trim(), "true" | "1");
        }
        Ok(self)
    }

    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error; with no explicit
    /// path and no user config file the defaults are returned.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    PanelError::Configuration(format!("Failed to read config file {path:?}: {e}"))
                })?;
                Self::from_toml_str(&content).map_err(|e| match e {
                    PanelError::Configuration(msg) => {
                        PanelError::Configuration(format!("{path:?}: {msg}"))
                    }
                    other => other,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse a TOML document. Missing sections and fields keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)
            .map_err(|e| PanelError::Configuration(format!("Failed to parse config: {e}")))?;
        Ok(file.into_config())
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(PanelError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(user_config_path().filter(|p| p.exists()))
    }
}

/// `~/.godpanel/config.toml`, when a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".godpanel").join("config.toml"))
}

/// On-disk layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    retry: RetrySection,
    #[serde(default)]
    cache: CacheSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiSection {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    log_requests: Option<bool>,
    login_route: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetrySection {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    multiplier: Option<u32>,
    statuses: Option<Vec<u16>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheSection {
    ttl_secs: Option<u64>,
    max_entries: Option<usize>,
}

impl FileConfig {
    fn into_config(self) -> ClientConfig {
        let mut config = ClientConfig::default();

        let api = self.api;
        if let Some(url) = api.base_url {
            config.base_url = url;
        }
        if let Some(ms) = api.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(enabled) = api.log_requests {
            config.log_requests = enabled;
        }
        if let Some(route) = api.login_route {
            config.login_route = route;
        }
        config.headers = api.headers.into_iter().collect();

        let retry = self.retry;
        if let Some(n) = retry.max_retries {
            config.retry.max_retries = n;
        }
        if let Some(ms) = retry.base_delay_ms {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(factor) = retry.multiplier {
            config.retry.multiplier = factor;
        }
        if let Some(statuses) = retry.statuses {
            config.retry.retry_statuses = statuses;
        }

        if let Some(secs) = self.cache.ttl_secs {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(n) = self.cache.max_entries {
            config.cache.max_entries = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.login_route, "/auth/login");
        assert!(!config.log_requests);
    }

    #[test]
    fn parse_minimal_config() {
        let config = ClientConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://panel.test/api"
        "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://panel.test/api");
        // Defaults preserved
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn parse_full_config() {
        let config = ClientConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://panel.test/api"
            timeout_ms = 2500
            log_requests = true
            login_route = "/login"

            [api.headers]
            X-Tenant = "acme"

            [retry]
            max_retries = 5
            base_delay_ms = 200
            multiplier = 3
            statuses = [503]

            [cache]
            ttl_secs = 60
            max_entries = 10
        "#,
        )
        .unwrap();
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(config.log_requests);
        assert_eq!(config.login_route, "/login");
        assert_eq!(
            config.headers,
            vec![("X-Tenant".to_string(), "acme".to_string())]
        );
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(200));
        assert_eq!(config.retry.multiplier, 3);
        assert_eq!(config.retry.retry_statuses, vec![503]);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.max_entries, 10);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ClientConfig::from_toml_str("[api]\nbase_uri = \"x\"").unwrap_err();
        assert!(matches!(err, PanelError::Configuration(_)));
    }

    #[test]
    fn env_overrides() {
        let config = ClientConfig::default()
            .apply_env_with(env(&[
                ("API_URL", "http://fallback.test"),
                ("NUXT_PUBLIC_API_URL", "http://public.test"),
                ("API_TIMEOUT", "1500"),
                ("ENABLE_API_LOGGING", "true"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://public.test");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(config.log_requests);
    }

    #[test]
    fn env_api_url_fallback() {
        let config = ClientConfig::default()
            .apply_env_with(env(&[("API_URL", "http://fallback.test")]))
            .unwrap();
        assert_eq!(config.base_url, "http://fallback.test");
    }

    #[test]
    fn env_invalid_timeout() {
        let err = ClientConfig::default()
            .apply_env_with(env(&[("API_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("API_TIMEOUT"));
    }

    #[test]
    fn env_logging_flag_values() {
        for (raw, expected) in [("1", true), ("true", true), ("false", false), ("yes", false)] {
            let config = ClientConfig::default()
                .apply_env_with(env(&[("ENABLE_API_LOGGING", raw)]))
                .unwrap();
            assert_eq!(config.log_requests, expected, "{raw}");
        }
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = ClientConfig::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
