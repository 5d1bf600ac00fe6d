//! Caching subsystem.
//!
//! - [`ResponseCache`] holds successful GET envelopes for a bounded time,
//!   keyed on request identity. Owned by the client; mutations invalidate
//!   it through [`ApiClient::invalidate_resource()`](crate::ApiClient::invalidate_resource)
//!   and friends.

pub mod response;

pub use response::{CacheConfig, ResponseCache};
