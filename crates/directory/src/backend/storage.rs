//! Hosted object storage client.
//!
//! Bucket uploads with upsert and cache-control headers, plus public URL
//! derivation. Paths are built by the submission flows; this client only
//! moves bytes.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::config::BackendConfig;

use super::traits::ObjectStore;
use super::{BackendError, api_error};

/// Cache directive the storage service stamps on uploaded objects.
const CACHE_CONTROL: &str = "max-age=3600";

/// Client for the hosted storage service.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    /// `{project}/storage/v1` without a trailing slash.
    base: String,
    anon_key: String,
}

impl StorageClient {
    /// Create a new storage service client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                base: format!("{}/storage/v1", config.base()),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(format!("{}/object/{bucket}/{path}", self.inner.base))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, CACHE_CONTROL)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{bucket}/{path}", self.inner.base)
    }
}
