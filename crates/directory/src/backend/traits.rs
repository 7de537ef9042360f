//! Seams for the consumed backend services.
//!
//! Everything stateful in this crate depends on these traits rather than
//! the concrete reqwest clients, so tests can stand in fakes with scripted
//! latency and failures.

use async_trait::async_trait;
use townboard_core::{Email, UserId};
use url::Url;

use super::types::{ApplicationRecord, ListingInsert, ListingRow, OAuthProvider, Session};
use super::BackendError;

/// The hosted auth service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email + password for a session.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, BackendError>;

    /// Build the authorize URL that starts a redirect-based OAuth flow.
    ///
    /// Initiation only; the resulting session arrives out of band.
    fn authorize_url(&self, provider: OAuthProvider) -> Result<Url, BackendError>;

    /// Mint a fresh session from a stored refresh token.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

/// Read access to the remote profile rows.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    /// Fetch the premium flag for a user.
    ///
    /// Returns `Ok(None)` when no profile row exists yet (freshly signed-up
    /// identities get their row provisioned asynchronously).
    async fn premium_flag(&self, user_id: UserId) -> Result<Option<bool>, BackendError>;
}

/// Read/write access to business listing rows.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch all listing rows the directory shows.
    async fn fetch_listings(&self) -> Result<Vec<ListingRow>, BackendError>;

    /// Persist a new listing via the insert RPC.
    async fn insert_listing(&self, listing: &ListingInsert) -> Result<(), BackendError>;
}

/// Write access to job-application rows.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persist a job application.
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), BackendError>;
}

/// The hosted object storage service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes to `bucket` at `path`.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), BackendError>;

    /// Derive the public URL for an uploaded object.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
