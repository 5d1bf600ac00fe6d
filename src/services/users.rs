//! User management.

use serde_json::{Value, json};

use super::endpoints::users as endpoints;
use super::repository::Repository;
use super::{invalidate, to_params};
use crate::client::ApiClient;
use crate::types::{
    ApiResponse, NewUser, Page, Params, RequestDescriptor, Role, User, UserFilters,
    UserStatistics, UserUpdate,
};
use crate::Result;

/// User CRUD plus role, permission and activation management.
///
/// Repository operations are reached through [`repository()`](Self::repository)
/// or the forwarding methods below.
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Repository<User, NewUser, UserUpdate>,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            repository: Repository::new(client, endpoints::LIST),
        }
    }

    pub fn repository(&self) -> &Repository<User, NewUser, UserUpdate> {
        &self.repository
    }

    fn client(&self) -> &ApiClient {
        self.repository.client()
    }

    pub async fn find_all(&self, params: Option<Params>) -> Result<ApiResponse<Vec<User>>> {
        self.repository.find_all(params).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<ApiResponse<User>> {
        self.repository.find_by_id(id).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<ApiResponse<User>> {
        self.repository.create(user).await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<ApiResponse<User>> {
        self.repository.update(id, update).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse<Value>> {
        self.repository.delete(id).await
    }

    pub async fn find_paginated(
        &self,
        page: u32,
        limit: u32,
        params: Option<Params>,
    ) -> Result<ApiResponse<Page<User>>> {
        self.repository.find_paginated(page, limit, params).await
    }

    pub async fn find_by_role(&self, role: Role) -> Result<ApiResponse<Vec<User>>> {
        self.client().get(&endpoints::by_role(role.as_str())).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<ApiResponse<User>> {
        self.client().get(&endpoints::by_email(email)).await
    }

    pub async fn permissions(&self, user_id: &str) -> Result<ApiResponse<Vec<String>>> {
        self.client().get(&endpoints::permissions(user_id)).await
    }

    pub async fn update_permissions(
        &self,
        user_id: &str,
        permissions: &[String],
    ) -> Result<ApiResponse<Value>> {
        let url = endpoints::permissions(user_id);
        let request =
            RequestDescriptor::put(url.as_str()).body(json!({ "permissions": permissions }));
        self.client().mutate(request, invalidate(&url)).await
    }

    /// Public profile of a user (not the signed-in user's own profile).
    pub async fn profile(&self, user_id: &str) -> Result<ApiResponse<User>> {
        self.client().get(&endpoints::profile(user_id)).await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<ApiResponse<User>> {
        let url = endpoints::profile(user_id);
        let request = RequestDescriptor::put(url.as_str()).body(serde_json::to_value(update)?);
        self.client().mutate(request, invalidate(&url)).await
    }

    pub async fn toggle_active(&self, user_id: &str) -> Result<ApiResponse<User>> {
        let request = RequestDescriptor::patch(endpoints::toggle_active(user_id));
        self.client()
            .mutate(request, |_| self.invalidate_user(user_id))
            .await
    }

    pub async fn bulk_activate(&self, user_ids: &[&str]) -> Result<ApiResponse<Vec<User>>> {
        self.bulk_status(endpoints::BULK_ACTIVATE, user_ids).await
    }

    pub async fn bulk_deactivate(&self, user_ids: &[&str]) -> Result<ApiResponse<Vec<User>>> {
        self.bulk_status(endpoints::BULK_DEACTIVATE, user_ids).await
    }

    async fn bulk_status(&self, url: &str, user_ids: &[&str]) -> Result<ApiResponse<Vec<User>>> {
        let request = RequestDescriptor::patch(url).body(json!({ "userIds": user_ids }));
        self.client().mutate(request, ApiClient::clear_cache).await
    }

    pub async fn statistics(&self) -> Result<ApiResponse<UserStatistics>> {
        self.client().get(endpoints::STATISTICS).await
    }

    pub async fn search_advanced(
        &self,
        filters: &UserFilters,
        page: u32,
        limit: u32,
    ) -> Result<ApiResponse<Page<User>>> {
        let request = RequestDescriptor::get(endpoints::SEARCH_ADVANCED)
            .params(to_params(filters)?)
            .param("page", page)
            .param("limit", limit);
        self.client().request_as(request).await
    }

    /// Whether a user with `email` exists. Only a 404 means "no".
    pub async fn exists(&self, email: &str) -> Result<bool> {
        match self.find_by_email(email).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Total number of users, from the statistics endpoint.
    ///
    /// An unsuccessful envelope counts as zero; request failures propagate.
    pub async fn user_count(&self) -> Result<u64> {
        let stats = self.statistics().await?;
        Ok(stats
            .data
            .filter(|_| stats.success)
            .map_or(0, |s| s.total_users))
    }

    fn invalidate_user(&self, user_id: &str) {
        self.client()
            .invalidate_resource(&self.repository.item_url(user_id));
        self.client().invalidate_resource(endpoints::LIST);
    }
}
