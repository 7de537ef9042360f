//! Hosted auth service client.
//!
//! Speaks the token-grant REST surface: password grant, refresh grant,
//! OAuth authorize-URL construction, and sign-out.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;
use townboard_core::Email;
use url::Url;

use crate::config::BackendConfig;

use super::traits::AuthApi;
use super::types::{OAuthProvider, Session};
use super::{BackendError, api_error};

/// Client for the hosted auth service.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    /// `{project}/auth/v1` without a trailing slash.
    base: String,
    anon_key: String,
    oauth_redirect: Option<String>,
}

impl AuthClient {
    /// Create a new auth service client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                base: format!("{}/auth/v1", config.base()),
                anon_key: config.anon_key.expose_secret().to_string(),
                oauth_redirect: config.oauth_redirect.clone(),
            }),
        }
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, BackendError> {
        let response = self
            .inner
            .client
            .post(format!("{}/token", self.inner.base))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.inner.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, BackendError> {
        self.token_grant(
            "password",
            json!({ "email": email.as_str(), "password": password }),
        )
        .await
    }

    fn authorize_url(&self, provider: OAuthProvider) -> Result<Url, BackendError> {
        let mut url = Url::parse(&format!("{}/authorize", self.inner.base))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str());
        if let Some(redirect) = &self.inner.oauth_redirect {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }
        Ok(url)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(format!("{}/logout", self.inner.base))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token)
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
