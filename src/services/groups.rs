//! Groups (projects) and their membership.

use serde_json::{Value, json};

use super::endpoints::groups as endpoints;
use super::repository::Repository;
use crate::client::ApiClient;
use crate::types::{ApiResponse, Group, GroupUpdate, NewGroup, RequestDescriptor, User};
use crate::Result;

#[derive(Debug, Clone)]
pub struct GroupService {
    repository: Repository<Group, NewGroup, GroupUpdate>,
}

impl GroupService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            repository: Repository::new(client, endpoints::LIST),
        }
    }

    /// CRUD operations on groups.
    pub fn repository(&self) -> &Repository<Group, NewGroup, GroupUpdate> {
        &self.repository
    }

    fn client(&self) -> &ApiClient {
        self.repository.client()
    }

    pub async fn members(&self, group_id: &str) -> Result<ApiResponse<Vec<User>>> {
        self.client().get(&endpoints::members(group_id)).await
    }

    pub async fn add_member(&self, group_id: &str, user_id: &str) -> Result<ApiResponse<Value>> {
        let request =
            RequestDescriptor::post(endpoints::members(group_id)).body(json!({ "userId": user_id }));
        self.client()
            .mutate(request, |_| self.invalidate_membership(group_id))
            .await
    }

    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(endpoints::member(group_id, user_id));
        self.client()
            .mutate(request, |_| self.invalidate_membership(group_id))
            .await
    }

    /// Member lists and counts are both stale after a membership change.
    fn invalidate_membership(&self, group_id: &str) {
        self.client().invalidate_resource(&endpoints::members(group_id));
        self.client().invalidate_resource(&endpoints::item(group_id));
        self.client().invalidate_resource(endpoints::LIST);
    }
}
