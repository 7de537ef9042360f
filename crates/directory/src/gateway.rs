//! Directory reads: cached listing fetches, client-side filtering, and
//! the in-memory promotional ads list.

use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{ListingInsert, ListingRow, ListingStore};
use crate::error::Result;

/// How long a fetched listing page stays fresh.
const LISTING_TTL: Duration = Duration::from_secs(60);

/// Promotional ads disappear this many days after creation.
const AD_LIFETIME_DAYS: i64 = 3;

/// Client-side listing filter.
///
/// Both criteria are conjunctive; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Exact category, compared case-insensitively.
    pub category: Option<String>,
    /// Substring matched against name, category, and description.
    pub search: Option<String>,
}

impl ListingFilter {
    fn matches(&self, row: &ListingRow) -> bool {
        if let Some(category) = &self.category {
            if !row.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let description = row.description.as_deref().unwrap_or_default();
            let haystack = format!("{} {} {}", row.name, row.category, description).to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// A promotional ad, held client-side only.
#[derive(Debug, Clone, PartialEq)]
pub struct Ad {
    pub id: Uuid,
    pub content: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Read path over the directory data, plus the ads list.
///
/// Cheaply cloneable; clones share the same cache and ads.
#[derive(Clone)]
pub struct DirectoryGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    listings: Arc<dyn ListingStore>,
    cache: Cache<(), Arc<Vec<ListingRow>>>,
    ads: RwLock<Vec<Ad>>,
}

impl DirectoryGateway {
    #[must_use]
    pub fn new(listings: Arc<dyn ListingStore>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                listings,
                cache: Cache::builder().max_capacity(1).time_to_live(LISTING_TTL).build(),
                ads: RwLock::new(Vec::new()),
            }),
        }
    }

    /// All listings, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache is cold and the remote fetch fails.
    pub async fn listings(&self) -> Result<Arc<Vec<ListingRow>>> {
        if let Some(rows) = self.inner.cache.get(&()).await {
            return Ok(rows);
        }
        let rows = Arc::new(self.inner.listings.fetch_listings().await?);
        debug!(count = rows.len(), "fetched listings");
        self.inner.cache.insert((), Arc::clone(&rows)).await;
        Ok(rows)
    }

    /// Listings matching `filter`, in fetch order.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::listings`].
    pub async fn search(&self, filter: &ListingFilter) -> Result<Vec<ListingRow>> {
        let rows = self.listings().await?;
        Ok(rows.iter().filter(|row| filter.matches(row)).cloned().collect())
    }

    /// Persist a new listing and drop the cached page so the next read
    /// sees it.
    ///
    /// # Errors
    ///
    /// Returns the data service's rejection.
    pub async fn add_listing(&self, listing: &ListingInsert) -> Result<()> {
        self.inner.listings.insert_listing(listing).await?;
        self.inner.cache.invalidate(&()).await;
        Ok(())
    }

    /// Add a promotional ad; it expires three days from now.
    pub fn add_ad(&self, content: serde_json::Map<String, serde_json::Value>) -> Uuid {
        let now = Utc::now();
        let ad = Ad {
            id: Uuid::new_v4(),
            content,
            created_at: now,
            expires_at: now + chrono::Duration::days(AD_LIFETIME_DAYS),
        };
        let id = ad.id;
        self.write_ads(|ads| ads.push(ad));
        id
    }

    /// Remove an ad by id. Unknown ids are ignored.
    pub fn remove_ad(&self, id: Uuid) {
        self.write_ads(|ads| ads.retain(|ad| ad.id != id));
    }

    /// Ads that have not yet expired. Expired ads are dropped here.
    #[must_use]
    pub fn ads(&self) -> Vec<Ad> {
        self.ads_at(Utc::now())
    }

    fn ads_at(&self, now: DateTime<Utc>) -> Vec<Ad> {
        let mut snapshot = Vec::new();
        self.write_ads(|ads| {
            ads.retain(|ad| ad.expires_at > now);
            snapshot = ads.clone();
        });
        snapshot
    }

    fn write_ads(&self, f: impl FnOnce(&mut Vec<Ad>)) {
        match self.inner.ads.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
