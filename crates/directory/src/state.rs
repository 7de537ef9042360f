//! Application state: one bundle wiring config, backend clients, session
//! store, entitlement cache, gateway, and the submission flows.

use std::sync::Arc;

use crate::auth::{AuthSubscription, SessionStore};
use crate::backend::{AuthClient, RestClient, StorageClient};
use crate::config::TownboardConfig;
use crate::device::{AssetSource, FixedLocator, FsAssetSource, Locator};
use crate::entitlement::EntitlementCache;
use crate::gateway::DirectoryGateway;
use crate::submissions::{ApplicationSubmitter, BusinessSubmitter};

/// Everything a front end needs, behind one cheaply cloneable handle.
///
/// Construction spawns the auth event task; it runs for as long as any
/// clone of the state is alive.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    config: TownboardConfig,
    sessions: SessionStore,
    entitlement: EntitlementCache,
    gateway: DirectoryGateway,
    businesses: BusinessSubmitter,
    applications: ApplicationSubmitter,
    _subscription: AuthSubscription,
}

impl AppState {
    /// Wire the live backend clients behind the given config.
    #[must_use]
    pub fn new(config: TownboardConfig) -> Self {
        Self::with_device(config, Arc::new(FsAssetSource), Arc::new(FixedLocator::default()))
    }

    /// Wire the live backend clients with caller-chosen device seams.
    #[must_use]
    pub fn with_device(
        config: TownboardConfig,
        assets: Arc<dyn AssetSource>,
        locator: Arc<dyn Locator>,
    ) -> Self {
        let auth = Arc::new(AuthClient::new(&config.backend));
        let rest = Arc::new(RestClient::new(&config.backend));
        let storage = Arc::new(StorageClient::new(&config.backend));

        let entitlement = EntitlementCache::new(rest.clone());
        let (sessions, subscription) = SessionStore::start(auth, entitlement.clone());
        let gateway = DirectoryGateway::new(rest.clone());
        let businesses = BusinessSubmitter::new(
            entitlement.clone(),
            gateway.clone(),
            storage.clone(),
            assets.clone(),
            locator,
            config.backend.business_bucket.clone(),
        );
        let applications = ApplicationSubmitter::new(
            rest,
            storage,
            assets,
            config.backend.documents_bucket.clone(),
        );

        Self {
            inner: Arc::new(StateInner {
                config,
                sessions,
                entitlement,
                gateway,
                businesses,
                applications,
                _subscription: subscription,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TownboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    #[must_use]
    pub fn entitlement(&self) -> &EntitlementCache {
        &self.inner.entitlement
    }

    #[must_use]
    pub fn gateway(&self) -> &DirectoryGateway {
        &self.inner.gateway
    }

    #[must_use]
    pub fn businesses(&self) -> &BusinessSubmitter {
        &self.inner.businesses
    }

    #[must_use]
    pub fn applications(&self) -> &ApplicationSubmitter {
        &self.inner.applications
    }
}
