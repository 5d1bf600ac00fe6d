//! Request/response interceptors.
//!
//! Interceptors see every attempt, retries included, in registration
//! order. They may rewrite the outgoing [`HttpRequest`] and observe what
//! came back; they cannot turn a failure into a success.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;

use crate::platform::{AUTH_TOKEN_KEY, KeyValueStore};
use crate::transport::{HttpRequest, HttpResponse, TransportError};
use crate::types::Method;

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUSTER_PARAM: &str = "_t";

/// Hook into every attempt of the pipeline.
pub trait Interceptor: Send + Sync {
    /// Interceptor name for logging/debugging.
    fn name(&self) -> &str;

    fn on_request(&self, _request: &mut HttpRequest) {}

    fn on_response(&self, _request: &HttpRequest, _response: &HttpResponse) {}

    fn on_error(&self, _request: &HttpRequest, _error: &TransportError) {}
}

/// Attaches `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    store: Arc<dyn KeyValueStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &str {
        "bearer_auth"
    }

    fn on_request(&self, request: &mut HttpRequest) {
        if let Some(token) = self.store.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty()) {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
    }
}

/// Adds `_t=<epoch millis>` to GETs so intermediaries never serve stale data.
///
/// Only the wire request changes; request identity is computed before
/// interceptors run.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheBuster;

impl Interceptor for CacheBuster {
    fn name(&self) -> &str {
        "cache_buster"
    }

    fn on_request(&self, request: &mut HttpRequest) {
        if request.method != Method::Get {
            return;
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        request
            .params
            .insert(CACHE_BUSTER_PARAM.to_string(), Value::from(millis));
    }
}

/// Logs requests and responses at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl Interceptor for RequestLogger {
    fn name(&self) -> &str {
        "request_logger"
    }

    fn on_request(&self, request: &mut HttpRequest) {
        debug!(
            method = %request.method,
            url = %request.url,
            params = ?request.params,
            body = ?request.body,
            "api request"
        );
    }

    fn on_response(&self, request: &HttpRequest, response: &HttpResponse) {
        debug!(
            status = response.status,
            url = %request.url,
            body = %response.body,
            "api response"
        );
    }

    fn on_error(&self, request: &HttpRequest, error: &TransportError) {
        debug!(
            url = %request.url,
            timed_out = error.timed_out,
            error = %error,
            "api request failed without response"
        );
    }
}
