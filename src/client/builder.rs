//! Builder for configuring client instances

use std::sync::Arc;
use std::time::Duration;

use super::inflight::InflightRegistry;
use super::interceptor::{BearerAuth, CacheBuster, Interceptor, RequestLogger};
use super::{ApiClient, ClientInner, RetryPolicy};
use crate::cache::{CacheConfig, ResponseCache};
use crate::platform::{KeyValueStore, MemoryStore, Navigator, NoopNavigator};
use crate::transport::{ReqwestTransport, Transport};
use crate::{ClientConfig, Result};

/// Builder for configuring client instances.
///
/// Anything left unset falls back to a default: the reqwest transport
/// built from the config, an in-memory store and a navigator that only
/// logs.
///
/// ```rust
/// # use godpanel::{ApiClient, RetryPolicy};
/// # use std::time::Duration;
/// let client = ApiClient::builder()
///     .base_url("http://localhost:4000")
///     .timeout(Duration::from_secs(5))
///     .retry(RetryPolicy::disabled())
///     .build()
///     .unwrap();
/// assert_eq!(client.pending_requests(), 0);
/// ```
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            store: None,
            navigator: None,
            interceptors: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.config.cache = config;
        self
    }

    /// Log requests, responses and errors at `debug`.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.config.log_requests = enabled;
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.config.login_route = route.into();
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the key-value store holding tokens and the signed-in user.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Add an interceptor. Custom interceptors run after the built-in
    /// bearer-token and cache-busting ones, in the order added.
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Build the client.
    ///
    /// Fails only when the default transport cannot be built from the
    /// config (invalid base URL or header).
    pub fn build(self) -> Result<ApiClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>);
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(NoopNavigator) as Arc<dyn Navigator>);

        // =====================================================================
        // Interceptor chain: auth and cache busting first, logging last
        // =====================================================================

        let mut interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(BearerAuth::new(Arc::clone(&store))),
            Arc::new(CacheBuster),
        ];
        interceptors.extend(self.interceptors);
        if self.config.log_requests {
            interceptors.push(Arc::new(RequestLogger));
        }

        let ClientConfig {
            retry,
            cache,
            log_requests,
            login_route,
            ..
        } = self.config;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                transport,
                interceptors,
                retry,
                cache: ResponseCache::new(cache),
                inflight: Arc::new(InflightRegistry::new()),
                store,
                navigator,
                login_route,
                log_requests,
            }),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
