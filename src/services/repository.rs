//! Generic CRUD repository over one REST resource.
//!
//! [`Repository`] issues the standard list/item/bulk calls against an
//! endpoint and keeps the response cache coherent with the mutations it
//! makes:
//!
//! | operation                    | invalidates                 |
//! |------------------------------|-----------------------------|
//! | `create`, `bulk_create`      | list and paginated list     |
//! | `update`, `patch`, `delete`  | the item, list, paginated   |
//! | `bulk_update`, `bulk_delete` | the whole cache             |
//!
//! Invalidation happens once the backend accepted the mutation (any 2xx),
//! even if the returned body then fails to decode.
//!
//! A GET that was already in flight when a mutation invalidated its url
//! still stores its response when it settles, and an identical GET issued
//! meanwhile joins it. Pass `noCache` to force a fresh read in that window.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::types::{ApiResponse, BulkUpdate, Page, Params, RequestDescriptor};
use crate::Result;

/// Repository for entity `T`, created from `C` and updated with `U`.
pub struct Repository<T, C, U> {
    client: ApiClient,
    endpoint: String,
    _marker: PhantomData<fn() -> (T, C, U)>,
}

impl<T, C, U> Clone for Repository<T, C, U> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, C, U> fmt::Debug for Repository<T, C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl<T, C, U> Repository<T, C, U>
where
    T: DeserializeOwned,
    C: Serialize,
    U: Serialize,
{
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            _marker: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Path of one item.
    pub fn item_url(&self, id: &str) -> String {
        format!("{}/{id}", self.endpoint)
    }

    fn paginated_url(&self) -> String {
        format!("{}/paginated", self.endpoint)
    }

    fn bulk_url(&self) -> String {
        format!("{}/bulk", self.endpoint)
    }

    pub async fn find_all(&self, params: Option<Params>) -> Result<ApiResponse<Vec<T>>> {
        let request =
            RequestDescriptor::get(self.endpoint.as_str()).params(params.unwrap_or_default());
        self.client.request_as(request).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<ApiResponse<T>> {
        self.client.get(&self.item_url(id)).await
    }

    pub async fn create(&self, data: &C) -> Result<ApiResponse<T>> {
        let request = RequestDescriptor::post(self.endpoint.as_str()).body(serde_json::to_value(data)?);
        self.client.mutate(request, |_| self.invalidate_list()).await
    }

    /// Replace an item.
    pub async fn update(&self, id: &str, data: &U) -> Result<ApiResponse<T>> {
        let request = RequestDescriptor::put(self.item_url(id)).body(serde_json::to_value(data)?);
        self.client.mutate(request, |_| self.invalidate_item(id)).await
    }

    /// Partially update an item.
    pub async fn patch(&self, id: &str, data: &U) -> Result<ApiResponse<T>> {
        let request = RequestDescriptor::patch(self.item_url(id)).body(serde_json::to_value(data)?);
        self.client.mutate(request, |_| self.invalidate_item(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(self.item_url(id));
        self.client.mutate(request, |_| self.invalidate_item(id)).await
    }

    /// Full-text search: `GET {endpoint}/search?q=...`.
    pub async fn search(&self, query: &str, params: Option<Params>) -> Result<ApiResponse<Vec<T>>> {
        let request = RequestDescriptor::get(format!("{}/search", self.endpoint))
            .params(params.unwrap_or_default())
            .param("q", query);
        self.client.request_as(request).await
    }

    pub async fn find_paginated(
        &self,
        page: u32,
        limit: u32,
        params: Option<Params>,
    ) -> Result<ApiResponse<Page<T>>> {
        let request = RequestDescriptor::get(self.paginated_url())
            .params(params.unwrap_or_default())
            .param("page", page)
            .param("limit", limit);
        self.client.request_as(request).await
    }

    pub async fn bulk_create(&self, items: &[C]) -> Result<ApiResponse<Vec<T>>> {
        let body = json!({ "items": serde_json::to_value(items)? });
        let request = RequestDescriptor::post(self.bulk_url()).body(body);
        self.client.mutate(request, |_| self.invalidate_list()).await
    }

    pub async fn bulk_update(&self, updates: &[BulkUpdate<U>]) -> Result<ApiResponse<Vec<T>>> {
        let body = json!({ "updates": serde_json::to_value(updates)? });
        let request = RequestDescriptor::put(self.bulk_url()).body(body);
        self.client.mutate(request, ApiClient::clear_cache).await
    }

    pub async fn bulk_delete(&self, ids: &[&str]) -> Result<ApiResponse<Value>> {
        let request = RequestDescriptor::delete(self.bulk_url()).body(json!({ "ids": ids }));
        self.client.mutate(request, ApiClient::clear_cache).await
    }

    fn invalidate_list(&self) {
        self.client.invalidate_resource(&self.endpoint);
        self.client.invalidate_resource(&self.paginated_url());
    }

    fn invalidate_item(&self, id: &str) {
        self.client.invalidate_resource(&self.item_url(id));
        self.invalidate_list();
    }
}
