use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::types::{
    ACTION_EXTRACT_RECEIPT, ACTION_SAVE_RECEIPT, Envelope, ExtractReceiptRequest, ReceiptFields,
    ResourceQuery, SaveReceiptRequest, SaveReceiptResponse,
};
use crate::config::ApiConfig;
use crate::errors::{ApiError, ApiResult};

/// Backend actions used by the receipt and list views
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Run OCR on a base64 JPEG and return the fields it found
    async fn extract_receipt(&self, image_base64: &str) -> ApiResult<ReceiptFields>;

    /// Store the receipt image with its fields; returns the uploaded file URL
    async fn save_receipt(
        &self,
        image_base64: &str,
        fields: &ReceiptFields,
    ) -> ApiResult<SaveReceiptResponse>;

    /// Read a list or detail resource as raw JSON
    async fn fetch_resource(&self, query: &ResourceQuery) -> ApiResult<Value>;
}

/// [`BackendClient`] for an Apps Script web app reached over HTTPS
pub struct AppsScriptClient {
    client: Client,
    endpoint: Url,
}

impl AppsScriptClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let raw = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ApiError::InvalidEndpoint {
                url: String::new(),
                message: "api.endpoint is not configured".to_string(),
            })?;
        let endpoint = Url::parse(raw).map_err(|e| ApiError::InvalidEndpoint {
            url: raw.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint {
                url: raw.to_string(),
                message: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        info!("Backend client targeting {}", redact_endpoint(&endpoint));
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_action<B, T>(&self, action: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        debug!("POST {} to {}", action, redact_endpoint(&self.endpoint));

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let text = response.text().await?;
        debug!("{} returned {} bytes", action, text.len());
        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        envelope.into_result(action)
    }
}

#[async_trait]
impl BackendClient for AppsScriptClient {
    async fn extract_receipt(&self, image_base64: &str) -> ApiResult<ReceiptFields> {
        let request = ExtractReceiptRequest::new(image_base64);
        self.post_action(ACTION_EXTRACT_RECEIPT, &request).await
    }

    async fn save_receipt(
        &self,
        image_base64: &str,
        fields: &ReceiptFields,
    ) -> ApiResult<SaveReceiptResponse> {
        let request = SaveReceiptRequest::new(image_base64, fields);
        self.post_action(ACTION_SAVE_RECEIPT, &request).await
    }

    async fn fetch_resource(&self, query: &ResourceQuery) -> ApiResult<Value> {
        self.post_action(query.action, query).await
    }
}

/// Scheme and host only; deployment ids in the path are not logged
pub fn redact_endpoint(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{}/***", url.scheme(), host),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(endpoint: Option<&str>) -> ApiConfig {
        ApiConfig {
            endpoint: endpoint.map(str::to_string),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_requires_endpoint() {
        let result = AppsScriptClient::new(&config(None));
        assert!(matches!(result, Err(ApiError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(AppsScriptClient::new(&config(Some("not a url"))).is_err());
        assert!(AppsScriptClient::new(&config(Some("ftp://example.com/exec"))).is_err());
    }

    #[test]
    fn test_accepts_web_app_url() {
        let client = AppsScriptClient::new(&config(Some(
            "https://script.google.com/macros/s/AKfy-deployment/exec",
        )))
        .unwrap();
        assert_eq!(client.endpoint().host_str(), Some("script.google.com"));
    }

    #[test]
    fn test_redact_endpoint_hides_path() {
        let url = Url::parse("https://script.google.com/macros/s/secret-id/exec").unwrap();
        let redacted = redact_endpoint(&url);
        assert_eq!(redacted, "https://script.google.com/***");
        assert!(!redacted.contains("secret-id"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = AppsScriptClient::new(&config(Some("http://127.0.0.1:9/exec"))).unwrap();
        let result = client.extract_receipt("abc").await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
