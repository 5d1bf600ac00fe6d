//! Typed services over the God Panel REST API.
//!
//! Each service is a thin layer over a shared [`ApiClient`]: it picks the
//! endpoint, shapes the body and invalidates the cached reads a successful
//! mutation makes stale. [`Services`] bundles one of each around a single
//! client.

mod auth;
mod dashboard;
pub mod endpoints;
mod groups;
mod repository;
mod settings;
mod users;

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::types::Params;
use crate::Result;

pub use auth::{AuthService, token_expiry};
pub use dashboard::DashboardService;
pub use groups::GroupService;
pub use repository::Repository;
pub use settings::SettingsService;
pub use users::UserService;

/// Every service, sharing one client.
#[derive(Debug, Clone)]
pub struct Services {
    pub api: ApiClient,
    pub auth: AuthService,
    pub users: UserService,
    pub groups: GroupService,
    pub dashboard: DashboardService,
    pub settings: SettingsService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            users: UserService::new(client.clone()),
            groups: GroupService::new(client.clone()),
            dashboard: DashboardService::new(client.clone()),
            settings: SettingsService::new(client.clone()),
            api: client,
        }
    }
}

/// Flatten a serializable filter into query params, skipping unset fields.
pub(crate) fn to_params<T: Serialize>(value: &T) -> Result<Params> {
    let params = match serde_json::to_value(value)? {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        _ => Params::new(),
    };
    Ok(params)
}

/// Invalidation hook for [`ApiClient::mutate`] that drops one resource.
pub(crate) fn invalidate(url: &str) -> impl FnOnce(&ApiClient) + '_ {
    move |client| {
        client.invalidate_resource(url);
    }
}
