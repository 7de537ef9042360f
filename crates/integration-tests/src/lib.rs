//! Shared test support for the flow tests.
//!
//! [`FakeBackend`] stands in for all three hosted services behind the
//! library's service traits, with call recording and scripted failures.
//! No network, no clock dependence; tests drive ordering explicitly via
//! the profile gate.

// Test support: lock poisoning aborts the test anyway.
#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use townboard_core::{BusinessId, Email, UserId};
use url::Url;
use uuid::Uuid;

use townboard_directory::backend::{
    ApplicationRecord, ApplicationStore, AuthApi, AuthUser, BackendError, ListingInsert,
    ListingRow, ListingStore, OAuthProvider, ObjectStore, ProfileReader, Session,
};
use townboard_directory::device::{AssetRef, AssetSource, DeviceError, LoadedAsset};

/// One recorded object-store upload.
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
}

/// In-memory stand-in for the auth, data, and storage services.
#[derive(Default)]
pub struct FakeBackend {
    accounts: Mutex<Vec<(String, String, Session)>>,
    premium: Mutex<HashMap<UserId, bool>>,
    gated_profiles: Mutex<HashSet<UserId>>,
    profile_started: Notify,
    profile_release: Notify,
    gate_open: AtomicBool,

    pub profile_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub fail_uploads: AtomicBool,

    pub rows: Mutex<Vec<ListingRow>>,
    pub inserts: Mutex<Vec<ListingInsert>>,
    pub uploads: Mutex<Vec<UploadCall>>,
    pub applications: Mutex<Vec<ApplicationRecord>>,
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return the session its sign-in produces.
    pub fn add_account(&self, email: &str, password: &str) -> Session {
        let session = Session {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
            expires_in: Some(3600),
            user: AuthUser {
                id: UserId::new(Uuid::new_v4()),
                email: Email::parse(email).unwrap(),
            },
        };
        self.accounts
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string(), session.clone()));
        session
    }

    pub fn set_premium(&self, user: UserId, flag: bool) {
        self.premium.lock().unwrap().insert(user, flag);
    }

    /// Make profile fetches for `user` block until [`Self::release_profiles`].
    pub fn gate_profile(&self, user: UserId) {
        self.gated_profiles.lock().unwrap().insert(user);
    }

    /// Wait until a gated profile fetch is in flight.
    pub async fn gated_fetch_started(&self) {
        self.profile_started.notified().await;
    }

    /// Release in-flight gated fetches and let later ones pass.
    pub fn release_profiles(&self) {
        self.gate_open.store(true, Ordering::SeqCst);
        self.profile_release.notify_waiters();
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, BackendError> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(e, p, _)| e == email.as_str() && p == password)
            .map(|(_, _, session)| session.clone())
            .ok_or(BackendError::Api {
                status: 400,
                message: "invalid login credentials".to_string(),
            })
    }

    fn authorize_url(&self, provider: OAuthProvider) -> Result<Url, BackendError> {
        let url = Url::parse(&format!(
            "https://auth.fake/authorize?provider={}",
            provider.as_str()
        ))?;
        Ok(url)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(_, _, session)| session.refresh_token == refresh_token)
            .map(|(_, _, session)| session.clone())
            .ok_or(BackendError::Api {
                status: 401,
                message: "refresh token revoked".to_string(),
            })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ProfileReader for FakeBackend {
    async fn premium_flag(&self, user_id: UserId) -> Result<Option<bool>, BackendError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let gated = self.gated_profiles.lock().unwrap().contains(&user_id);
        if gated && !self.gate_open.load(Ordering::SeqCst) {
            self.profile_started.notify_one();
            self.profile_release.notified().await;
        }
        Ok(self.premium.lock().unwrap().get(&user_id).copied())
    }
}

#[async_trait]
impl ListingStore for FakeBackend {
    async fn fetch_listings(&self) -> Result<Vec<ListingRow>, BackendError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert_listing(&self, listing: &ListingInsert) -> Result<(), BackendError> {
        self.inserts.lock().unwrap().push(listing.clone());
        self.rows.lock().unwrap().push(ListingRow {
            id: Some(BusinessId::new(Uuid::new_v4())),
            owner_id: Some(listing.owner_id),
            name: listing.name.clone(),
            category: listing.category.clone(),
            description: Some(listing.description.clone()),
            address: Some(listing.address.clone()),
            latitude: listing.latitude,
            longitude: listing.longitude,
            image_urls: Some(listing.image_urls.clone()),
            video_url: listing.video_url.clone(),
            working_hours: Some(listing.working_hours.clone()),
            supports_home_delivery: Some(listing.supports_home_delivery),
        });
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for FakeBackend {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), BackendError> {
        self.applications.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FakeBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
        content_type: &str,
        _upsert: bool,
    ) -> Result<(), BackendError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(UploadCall {
            bucket: bucket.to_string(),
            path: path.to_string(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://cdn.fake/{bucket}/{path}")
    }
}

/// Asset source serving fixed bytes for any reference.
pub struct MemoryAssets;

#[async_trait]
impl AssetSource for MemoryAssets {
    async fn load(&self, asset: &AssetRef) -> Result<LoadedAsset, DeviceError> {
        Ok(LoadedAsset {
            bytes: b"asset-bytes".to_vec(),
            extension: asset.extension(),
        })
    }
}

/// Yield until `condition` holds, panicking after a bounded number of
/// scheduler turns. Spawned work on the current-thread test runtime runs
/// during the yields.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition did not hold after 1000 scheduler turns");
}
