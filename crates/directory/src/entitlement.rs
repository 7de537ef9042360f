//! Premium entitlement cache.
//!
//! Caches the remote premium flag for the current identity. Reads are
//! synchronous and never perform I/O; refreshes are triggered by the
//! session store on every identity change.
//!
//! # Ordering
//!
//! Refreshes are tagged with an epoch taken when the refresh is requested.
//! A result whose epoch is no longer the newest is discarded, so a slow
//! fetch for a superseded identity can never overwrite the flag a newer
//! identity's refresh resolved. A refresh already in flight is not
//! cancelled; only its result is discardable.
//!
//! # Failure semantics
//!
//! The cache fails closed: a missing profile row resolves to `false`, and
//! a fetch error re-asserts `false` even when the identity has not
//! changed. Errors are logged and never propagate to callers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use townboard_core::UserId;
use tracing::{debug, warn};

use crate::backend::ProfileReader;

/// Cached premium flag with a stale-response guard.
///
/// Cheaply cloneable; clones share the same cache.
#[derive(Clone)]
pub struct EntitlementCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    profiles: Arc<dyn ProfileReader>,
    premium: AtomicBool,
    epoch: AtomicU64,
}

/// Tag identifying one requested refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RefreshTicket(u64);

impl EntitlementCache {
    /// Create a cache over the given profile reader. Starts at `false`.
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileReader>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                profiles,
                premium: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Last resolved premium flag. Never performs I/O.
    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.inner.premium.load(Ordering::SeqCst)
    }

    /// Refresh the flag for `user_id`.
    ///
    /// `None` resolves to `false` without any backend call. The result is
    /// applied only if no newer refresh was requested in the meantime.
    pub async fn refresh(&self, user_id: Option<UserId>) {
        let ticket = self.begin();
        self.resolve(ticket, user_id).await;
    }

    /// Claim the next epoch for a refresh about to run.
    ///
    /// Epochs are claimed in event order even when the fetch itself is
    /// spawned onto a separate task; claim before spawning.
    pub(crate) fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run the fetch for a claimed ticket and apply the result through the
    /// stale-response guard.
    pub(crate) async fn resolve(&self, ticket: RefreshTicket, user_id: Option<UserId>) {
        let value = match user_id {
            None => false,
            Some(id) => match self.inner.profiles.premium_flag(id).await {
                Ok(Some(flag)) => flag,
                Ok(None) => {
                    // No profile row provisioned yet; not an error.
                    false
                }
                Err(error) => {
                    // Fail closed rather than keep a possibly stale value.
                    warn!(user_id = %id, %error, "profile fetch failed");
                    false
                }
            },
        };

        if self.inner.epoch.load(Ordering::SeqCst) == ticket.0 {
            self.inner.premium.store(value, Ordering::SeqCst);
        } else {
            debug!(epoch = ticket.0, "discarding stale entitlement refresh");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use crate::backend::BackendError;

    /// Profile reader whose answers (and completion order) are scripted.
    #[derive(Default)]
    struct ScriptedProfiles {
        calls: AtomicUsize,
        premium_users: Vec<UserId>,
        missing_users: Vec<UserId>,
        failing_users: Vec<UserId>,
        /// Users whose fetch blocks until `release` is notified.
        gated_users: Vec<UserId>,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProfileReader for ScriptedProfiles {
        async fn premium_flag(&self, user_id: UserId) -> Result<Option<bool>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated_users.contains(&user_id) {
                self.started.notify_one();
                self.release.notified().await;
            }
            if self.failing_users.contains(&user_id) {
                return Err(BackendError::Api {
                    status: 500,
                    message: "scripted failure".to_string(),
                });
            }
            if self.missing_users.contains(&user_id) {
                return Ok(None);
            }
            Ok(Some(self.premium_users.contains(&user_id)))
        }
    }

    fn user() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_none_resolves_false_with_zero_calls() {
        let profiles = Arc::new(ScriptedProfiles::default());
        let cache = EntitlementCache::new(profiles.clone());

        cache.refresh(None).await;

        assert!(!cache.is_premium());
        assert_eq!(profiles.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_premium_user_resolves_true() {
        let id = user();
        let profiles = Arc::new(ScriptedProfiles {
            premium_users: vec![id],
            ..Default::default()
        });
        let cache = EntitlementCache::new(profiles);

        cache.refresh(Some(id)).await;
        assert!(cache.is_premium());
    }

    #[tokio::test]
    async fn test_missing_profile_row_is_false_not_error() {
        let id = user();
        let profiles = Arc::new(ScriptedProfiles {
            missing_users: vec![id],
            ..Default::default()
        });
        let cache = EntitlementCache::new(profiles.clone());

        cache.refresh(Some(id)).await;

        assert!(!cache.is_premium());
        assert_eq!(profiles.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_fails_closed_for_same_identity() {
        let id = user();
        let profiles = Arc::new(ScriptedProfiles {
            premium_users: vec![id],
            ..Default::default()
        });
        let cache = EntitlementCache::new(profiles.clone());
        cache.refresh(Some(id)).await;
        assert!(cache.is_premium());

        // Same identity, transient failure: flag is re-asserted false.
        let failing = Arc::new(ScriptedProfiles {
            failing_users: vec![id],
            ..Default::default()
        });
        let cache = EntitlementCache {
            inner: Arc::new(CacheInner {
                profiles: failing,
                premium: AtomicBool::new(true),
                epoch: AtomicU64::new(0),
            }),
        };
        cache.refresh(Some(id)).await;
        assert!(!cache.is_premium());
    }

    #[tokio::test]
    async fn test_stale_refresh_result_is_discarded() {
        let old_user = user();
        let new_user = user();
        // The old identity is premium but slow; the new one resolves
        // immediately to false. The late true must not leak through.
        let profiles = Arc::new(ScriptedProfiles {
            premium_users: vec![old_user],
            gated_users: vec![old_user],
            ..Default::default()
        });
        let cache = EntitlementCache::new(profiles.clone());

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.refresh(Some(old_user)).await })
        };
        // Wait for the old fetch to be in flight before superseding it.
        profiles.started.notified().await;

        cache.refresh(Some(new_user)).await;
        assert!(!cache.is_premium());

        profiles.release.notify_one();
        slow.await.unwrap();

        assert!(
            !cache.is_premium(),
            "stale refresh for a superseded identity overwrote the flag"
        );
    }

    #[tokio::test]
    async fn test_epoch_claim_order_beats_task_start_order() {
        let id = user();
        let profiles = Arc::new(ScriptedProfiles {
            premium_users: vec![id],
            ..Default::default()
        });
        let cache = EntitlementCache::new(profiles);

        // Claim for the identity refresh first, then let a sign-out
        // resolve before the fetch task even starts.
        let ticket = cache.begin();
        cache.refresh(None).await;
        cache.resolve(ticket, Some(id)).await;

        assert!(!cache.is_premium(), "superseded claim applied its result");
    }
}
