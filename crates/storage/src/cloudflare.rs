//! Cloudflare Workers KV over the REST API.
//!
//! Each value lives at
//! `/accounts/{account}/storage/kv/namespaces/{namespace}/values/{key}`
//! and is authenticated with a bearer API token. The same client serves
//! the alert-flag namespace and the namespace holding the run config.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use tierwatch_core::settings::CloudflareSettings;

use crate::error::StorageError;
use crate::traits::FlagStore;

const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

pub struct CloudflareKvStore {
    api_base: String,
    account_id: String,
    namespace_id: String,
    api_token: String,
    client: reqwest::Client,
}

impl CloudflareKvStore {
    pub fn new(account_id: String, namespace_id: String, api_token: String) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            account_id,
            namespace_id,
            api_token,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client for `namespace_id` using the account and token from settings.
    pub fn from_settings(
        settings: &CloudflareSettings,
        namespace_id: String,
    ) -> Result<Self, StorageError> {
        let account_id = settings
            .account_id
            .clone()
            .ok_or_else(|| StorageError::NotConfigured("CF_ACCOUNT_ID is not set".into()))?;
        let api_token = settings
            .api_token
            .clone()
            .ok_or_else(|| StorageError::NotConfigured("CF_API_TOKEN is not set".into()))?;
        Ok(Self::new(account_id, namespace_id, api_token))
    }

    /// Point the client at a different API root (e.g. a local mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// URL for a single value. The key is percent-encoded as one path segment.
    pub fn value_url(&self, key: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StorageError::NotConfigured(format!("invalid KV API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::NotConfigured("KV API base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([
                "accounts",
                self.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                self.namespace_id.as_str(),
                "values",
                key,
            ]);
        Ok(url)
    }

    async fn error_from(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StorageError::Api(format!("{status}: {body}"))
    }
}

#[async_trait]
impl FlagStore for CloudflareKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let response = self
            .client
            .get(self.value_url(key)?)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(response.text().await?)),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .put(self.value_url(key)?)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        debug!(namespace = %self.namespace_id, key, "KV value written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.value_url(key)?)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            s if s.is_success() => {
                debug!(namespace = %self.namespace_id, key, "KV value deleted");
                Ok(())
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    fn backend_name(&self) -> &str {
        "cloudflare-kv"
    }
}
