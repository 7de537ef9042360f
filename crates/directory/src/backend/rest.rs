//! Hosted data service client.
//!
//! Speaks a PostgREST-style row API: filtered selects, inserts with
//! minimal-return preference, and named-parameter RPC calls.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use townboard_core::UserId;
use tracing::debug;

use crate::config::BackendConfig;

use super::traits::{ApplicationStore, ListingStore, ProfileReader};
use super::types::{ApplicationRecord, ListingInsert, ListingRow, ProfileRow};
use super::{BackendError, api_error};

/// Columns the directory reads off a listing row.
const LISTING_COLUMNS: &str = "id,owner_id,name,category,description,address,latitude,longitude,\
                               image_urls,video_url,working_hours,supports_home_delivery";

/// Accept header asking the data service for exactly one object.
///
/// With it, a zero-row result answers 406 instead of an empty array; the
/// profile lookup maps that onto `Ok(None)`.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Client for the hosted data service.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    /// `{project}/rest/v1` without a trailing slash.
    base: String,
    anon_key: String,
}

impl RestClient {
    /// Create a new data service client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(RestClientInner {
                client: reqwest::Client::new(),
                base: format!("{}/rest/v1", config.base()),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base)
    }

    async fn insert_rows<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        rows: &[T],
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(table))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileReader for RestClient {
    async fn premium_flag(&self, user_id: UserId) -> Result<Option<bool>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("profiles"))
            .query(&[
                ("id", format!("eq.{user_id}")),
                ("select", "is_premium".to_string()),
            ])
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        let status = response.status();
        // Zero rows under the single-object header: the profile row has not
        // been provisioned yet, which is not an error.
        if status == reqwest::StatusCode::NOT_ACCEPTABLE {
            debug!(%user_id, "no profile row yet");
            return Ok(None);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let row: ProfileRow = serde_json::from_str(&text)?;
        Ok(Some(row.is_premium.unwrap_or(false)))
    }
}

#[async_trait]
impl ListingStore for RestClient {
    async fn fetch_listings(&self) -> Result<Vec<ListingRow>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("businesses"))
            .query(&[("select", LISTING_COLUMNS)])
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn insert_listing(&self, listing: &ListingInsert) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("rpc/insert_business_data"))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .json(listing)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for RestClient {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), BackendError> {
        self.insert_rows("job_applications", std::slice::from_ref(record))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use url::Url;

    #[test]
    fn test_endpoint_formatting() {
        let client = RestClient::new(&BackendConfig {
            project_url: Url::parse("https://abc.backend.test/").unwrap(),
            anon_key: SecretString::from("k".repeat(48)),
            business_bucket: "business-uploads".to_string(),
            documents_bucket: "application-documents".to_string(),
            oauth_redirect: None,
        });
        assert_eq!(
            client.endpoint("rpc/insert_business_data"),
            "https://abc.backend.test/rest/v1/rpc/insert_business_data"
        );
    }

    #[test]
    fn test_listing_columns_match_row_fields() {
        // Every selected column must deserialize into ListingRow.
        let row = serde_json::json!({
            "id": "11111111-2222-3333-4444-555555555555",
            "owner_id": null,
            "name": "Shop",
            "category": "Other",
            "description": "d",
            "address": "a",
            "latitude": 1.0,
            "longitude": 2.0,
            "image_urls": ["u"],
            "video_url": null,
            "working_hours": "9-5",
            "supports_home_delivery": true
        });
        for column in LISTING_COLUMNS.split(',') {
            assert!(row.get(column).is_some(), "column {column} missing");
        }
        let parsed: ListingRow = serde_json::from_value(row).unwrap();
        assert_eq!(parsed.supports_home_delivery, Some(true));
    }
}
