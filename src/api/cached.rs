//! Cache-through access to backend resources

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::client::BackendClient;
use super::types::{ReceiptFields, ResourceQuery, SaveReceiptResponse};
use crate::cache::{CacheKey, ResponseCache};
use crate::errors::ApiResult;

/// Wraps a [`BackendClient`] so list and detail reads are served from a
/// [`ResponseCache`] while their TTL holds
pub struct CachedBackend<C> {
    client: C,
    cache: Arc<ResponseCache>,
}

impl<C: BackendClient> CachedBackend<C> {
    pub fn new(client: C, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Read a resource, fetching only on a cache miss
    pub async fn resource(&self, key: CacheKey<'_>) -> ApiResult<Value> {
        let query = ResourceQuery::for_key(key);
        self.cache
            .get_or_fetch(&key.to_string(), || async {
                debug!("Fetching {} from backend", key);
                self.client.fetch_resource(&query).await
            })
            .await
    }

    /// Typed variant of [`resource`](Self::resource)
    pub async fn resource_as<T: DeserializeOwned>(&self, key: CacheKey<'_>) -> ApiResult<T> {
        let value = self.resource(key).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// OCR extraction is never cached
    pub async fn extract_receipt(&self, image_base64: &str) -> ApiResult<ReceiptFields> {
        self.client.extract_receipt(image_base64).await
    }

    /// Save a receipt and drop the lists it changes
    pub async fn save_receipt(
        &self,
        image_base64: &str,
        fields: &ReceiptFields,
    ) -> ApiResult<SaveReceiptResponse> {
        let response = self.client.save_receipt(image_base64, fields).await?;
        self.invalidate(CacheKey::ReceiptsList);
        self.invalidate(CacheKey::ExpensesData);
        Ok(response)
    }

    pub fn invalidate(&self, key: CacheKey<'_>) {
        if self.cache.remove(&key.to_string()) {
            debug!("Invalidated cached {}", key);
        }
    }

    /// Drop every cached response (logout or manual refresh)
    pub fn refresh_all(&self) {
        self.cache.clear();
    }
}
