//! godpanel - API client for the God Panel admin dashboard
//!
//! This crate talks to the God Panel REST backend. All traffic goes through
//! one [`ApiClient`], which caches GET responses, collapses concurrent
//! identical GETs into a single request, retries transient failures with
//! exponential backoff and normalizes every failure into an [`ApiError`].
//! Typed services for auth, users, groups, dashboard data and settings sit
//! on top of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use godpanel::{ApiClient, ClientConfig, Services};
//! use godpanel::types::LoginForm;
//!
//! #[tokio::main]
//! async fn main() -> godpanel::Result<()> {
//!     let client = ApiClient::new(ClientConfig::new().base_url("http://localhost:4000"))?;
//!     let services = Services::new(client);
//!
//!     services
//!         .auth
//!         .login(&LoginForm::new("admin@example.com", "secret"))
//!         .await?;
//!
//!     let stats = services.dashboard.stats().await?;
//!     println!("{:?}", stats.data);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod platform;
pub mod services;
pub mod telemetry;
pub mod transport;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use client::{ApiClient, ApiClientBuilder, Interceptor, RetryPolicy};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, PanelError, Result};
pub use platform::{KeyValueStore, Navigator};
pub use services::{
    AuthService, DashboardService, GroupService, Repository, Services, SettingsService,
    UserService,
};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiResponse, Method, Params, RequestDescriptor, RequestKey};
pub use version::PKG_VERSION;
