//! The API client pipeline.
//!
//! [`ApiClient`] is the single entry point for talking to the backend.
//! Every call flows through the same stages:
//!
//! 1. **cache**: GETs are answered from the [`ResponseCache`] when a fresh
//!    entry exists, unless the params carry a truthy `noCache`.
//! 2. **de-duplication**: concurrent identical GETs share one dispatch.
//!    A GET issued after an invalidation never joins, and never lets an
//!    older dispatch refill the cache.
//! 3. **dispatch**: interceptors rewrite the attempt, the [`Transport`]
//!    sends it; retryable GET failures are retried with backoff.
//! 4. **normalization**: the final failure becomes one [`ApiError`], and
//!    its side effects (credential clearing on 401) run exactly once.
//!
//! `ApiClient` is cheap to clone; clones share the cache, the in-flight
//! registry and the transport.

mod builder;
mod inflight;
mod interceptor;
mod retry;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::error::{ApiError, ErrorKind};
use crate::platform::{AUTH_TOKEN_KEY, KeyValueStore, Navigator, REFRESH_TOKEN_KEY, USER_KEY};
use crate::telemetry;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::types::{ApiResponse, Method, Params, RequestDescriptor, RequestKey};
use crate::{ClientConfig, Result};

pub use builder::ApiClientBuilder;
pub use inflight::InflightRegistry;
pub use interceptor::{BearerAuth, CACHE_BUSTER_PARAM, CacheBuster, Interceptor, RequestLogger};
pub use retry::{DEFAULT_RETRY_STATUSES, RetryPolicy};

use inflight::DispatchResult;

/// Handle to the backend. See module docs.
///
/// ```rust,no_run
/// # async fn example() -> godpanel::Result<()> {
/// use godpanel::{ApiClient, ClientConfig};
/// use serde_json::Value;
///
/// let client = ApiClient::new(ClientConfig::new().base_url("http://localhost:4000"))?;
/// let stats = client.get::<Value>("/dashboard/stats").await?;
/// println!("{:?}", stats.data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    retry: RetryPolicy,
    cache: ResponseCache,
    inflight: Arc<InflightRegistry>,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    log_requests: bool,
}

/// Why a single attempt did not succeed.
enum Failure {
    /// A response arrived with a non-2xx status.
    Status(HttpResponse),
    /// No response arrived.
    Transport(TransportError),
}

impl Failure {
    fn status(&self) -> Option<u16> {
        match self {
            Failure::Status(response) => Some(response.status),
            Failure::Transport(_) => None,
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.inner.transport.name())
            .field("interceptors", &self.inner.interceptors.len())
            .field("cached", &self.inner.cache.len())
            .field("pending", &self.inner.inflight.len())
            .finish()
    }
}

impl ApiClient {
    /// Client with default transport, storage and navigation for `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        ApiClientBuilder::new().config(config).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Send a request through the full pipeline.
    pub async fn request(&self, request: RequestDescriptor) -> Result<ApiResponse<Value>> {
        Ok(self.inner.execute(request).await?)
    }

    /// Send a request and decode the envelope data into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<ApiResponse<T>> {
        self.request(request).await?.decode()
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>> {
        self.request_as(RequestDescriptor::get(url)).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: &str,
        params: Params,
    ) -> Result<ApiResponse<T>> {
        self.request_as(RequestDescriptor::get(url).params(params))
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request_as(RequestDescriptor::post(url).body(body)).await
    }

    /// POST without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>> {
        self.request_as(RequestDescriptor::post(url)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request_as(RequestDescriptor::put(url).body(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request_as(RequestDescriptor::patch(url).body(body)).await
    }

    /// PATCH without a body.
    pub async fn patch_empty<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>> {
        self.request_as(RequestDescriptor::patch(url)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>> {
        self.request_as(RequestDescriptor::delete(url)).await
    }

    /// DELETE carrying a JSON body (bulk deletes).
    pub async fn delete_with_body<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request_as(RequestDescriptor::delete(url).body(body))
            .await
    }

    /// Send a mutation and run `invalidate` as soon as the backend accepted
    /// it, before the envelope data is decoded into `T`.
    ///
    /// A 2xx whose body does not fit `T` still returns
    /// [`PanelError::Json`](crate::PanelError::Json), but the cache no
    /// longer holds what the mutation made stale.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
        invalidate: impl FnOnce(&Self),
    ) -> Result<ApiResponse<T>> {
        let response = self.request(request).await?;
        invalidate(self);
        response.decode()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Drop exactly one cached response. Returns whether it was cached.
    pub fn clear_cache_key(&self, key: &RequestKey) -> bool {
        self.inner.cache.remove(key)
    }

    /// Drop every cached response for `url`, whatever its params.
    pub fn invalidate_resource(&self, url: &str) -> usize {
        let removed = self.inner.cache.invalidate_resource(url);
        debug!(url, removed, "invalidated cached resource");
        removed
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    /// Number of GET dispatches currently outstanding.
    pub fn pending_requests(&self) -> usize {
        self.inner.inflight.len()
    }
}

impl ClientInner {
    async fn execute(self: &Arc<Self>, request: RequestDescriptor) -> DispatchResult {
        if request.method != Method::Get {
            return self.dispatch(request).await;
        }

        let key = request.key();
        let bypass = request.bypasses_cache();
        if !bypass && let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "serving cached response");
            return Ok(hit);
        }

        let inner = Arc::clone(self);
        let cache_key = key.clone();
        let epoch = self.cache.epoch();
        let (dispatch, joined) = self.inflight.join_or_start(key.clone(), epoch, move |guard| {
            async move {
                let result = inner.dispatch(request).await;
                if !bypass
                    && let Ok(response) = &result
                    && !inner.cache.insert_if_current(cache_key, response.clone(), epoch)
                {
                    debug!("cache invalidated during dispatch, response not stored");
                }
                drop(guard);
                result
            }
            .boxed()
        });

        if joined {
            debug!(key = %key, "joining in-flight request");
            metrics::counter!(telemetry::DEDUPLICATED_TOTAL, "url" => key.url().to_owned())
                .increment(1);
        }
        dispatch.await
    }

    /// Send `request`, retrying per policy, and normalize the final failure.
    async fn dispatch(&self, request: RequestDescriptor) -> DispatchResult {
        let mut attempt = request;
        loop {
            let failure = match self.send_once(&attempt).await {
                Ok(response) => return Ok(response),
                Err(failure) => failure,
            };

            let status = failure.status();
            if !self.retry.should_retry(&attempt, status) {
                return Err(self.fail(failure));
            }

            let next = attempt.next_attempt();
            let delay = self.retry.delay_for_retry(next.retry_count());
            metrics::counter!(telemetry::RETRIES_TOTAL,
                "method" => attempt.method.as_str(),
                "status" => status.map(|s| s.to_string()).unwrap_or_default(),
            )
            .increment(1);
            warn!(
                method = %attempt.method,
                url = %attempt.url,
                status,
                retry = next.retry_count(),
                max_retries = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt = next;
        }
    }

    /// One attempt: interceptors, transport, status check.
    async fn send_once(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<ApiResponse<Value>, Failure> {
        let mut http = HttpRequest::from(request);
        for interceptor in &self.interceptors {
            interceptor.on_request(&mut http);
        }

        let start = Instant::now();
        let outcome = self.transport.send(&http).await;

        match outcome {
            Ok(response) => {
                Self::record_attempt(http.method, response.status.to_string(), start);
                for interceptor in &self.interceptors {
                    interceptor.on_response(&http, &response);
                }
                if response.is_success() {
                    Ok(ApiResponse::from_body(response.body))
                } else {
                    Err(Failure::Status(response))
                }
            }
            Err(error) => {
                let label = if error.timed_out { "timeout" } else { "network" };
                Self::record_attempt(http.method, label.to_string(), start);
                for interceptor in &self.interceptors {
                    interceptor.on_error(&http, &error);
                }
                Err(Failure::Transport(error))
            }
        }
    }

    /// Normalize the final failure and run its side effects.
    fn fail(&self, failure: Failure) -> ApiError {
        let error = match failure {
            Failure::Status(response) => ApiError::from_response(response),
            Failure::Transport(error) => ApiError::from_transport(&error),
        };

        match error.kind() {
            ErrorKind::Unauthorized => self.handle_unauthorized(),
            ErrorKind::Forbidden => {
                warn!(message = error.message(), "access forbidden");
            }
            _ => {}
        }

        if self.log_requests {
            debug!(
                kind = %error.kind(),
                status = error.status(),
                message = error.message(),
                "api error"
            );
        }
        error
    }

    /// Session is gone: forget credentials and authenticated data, go to login.
    fn handle_unauthorized(&self) {
        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to clear stored credential");
            }
        }
        self.cache.clear();

        let current = self.navigator.current_path();
        if !current.contains(&self.login_route) {
            info!(from = %current, to = %self.login_route, "session expired, redirecting to login");
            self.navigator.navigate_to(&self.login_route);
        }
    }

    /// Record attempt outcome metrics (counter + histogram).
    fn record_attempt(method: Method, status: String, start: Instant) {
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "method" => method.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "method" => method.as_str(),
        )
        .record(elapsed);
    }
}
