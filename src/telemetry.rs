//! Telemetry metric name constants.
//!
//! Centralised metric names for the client pipeline. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `panel_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method` — HTTP method (e.g. "GET", "POST")
//! - `status` — HTTP status code, or "network" / "timeout" when no response arrived
//! - `url` — request path relative to the base URL

/// Total attempts sent to the transport, retries included.
///
/// Labels: `method`, `status`.
pub const REQUESTS_TOTAL: &str = "panel_requests_total";

/// Attempt duration in seconds.
///
/// Labels: `method`.
pub const REQUEST_DURATION_SECONDS: &str = "panel_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `method`, `status`.
pub const RETRIES_TOTAL: &str = "panel_retries_total";

/// Total response cache hits.
///
/// Labels: `url`.
pub const CACHE_HITS_TOTAL: &str = "panel_cache_hits_total";

/// Total response cache misses, expired entries included.
///
/// Labels: `url`.
pub const CACHE_MISSES_TOTAL: &str = "panel_cache_misses_total";

/// Entries evicted to stay under the cache ceiling.
pub const CACHE_EVICTIONS_TOTAL: &str = "panel_cache_evictions_total";

/// GETs that joined an in-flight dispatch instead of starting their own.
///
/// Labels: `url`.
pub const DEDUPLICATED_TOTAL: &str = "panel_deduplicated_total";
