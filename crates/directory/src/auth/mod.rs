//! Session store and auth event channel.
//!
//! Holds the current session behind a synchronous read path and drives all
//! mutations through a single event inbox, so session changes apply in the
//! order the auth service emitted them regardless of how long any
//! follow-up work takes.
//!
//! Login is "request accepted" only: a successful call means the
//! credential exchange worked, and the session itself lands via a
//! [`AuthEvent::SignedIn`] event on the inbox. Everything that reacts to
//! identity changes (currently the entitlement cache) hangs off event
//! application, never off the login call sites.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use townboard_core::{Email, UserId};
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::{AuthApi, OAuthProvider, Session};
use crate::entitlement::EntitlementCache;
use crate::error::{AppError, Result};

/// A change to the authenticated identity.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// Startup resolution finished; carries whatever session was restored.
    Initial(Option<Session>),
    /// A credential exchange produced a session.
    SignedIn(Session),
    /// The session was revoked or dropped.
    SignedOut,
    /// Same identity, fresh tokens.
    TokenRefreshed(Session),
}

impl AuthEvent {
    fn session(&self) -> Option<&Session> {
        match self {
            Self::Initial(session) => session.as_ref(),
            Self::SignedIn(session) | Self::TokenRefreshed(session) => Some(session),
            Self::SignedOut => None,
        }
    }

    /// Whether this event represents a deliberate identity change, as
    /// opposed to startup resolution or a token rotation.
    fn is_transition(&self) -> bool {
        matches!(self, Self::SignedIn(_) | Self::SignedOut)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Initial(_) => "initial",
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
        }
    }
}

/// Handle keeping the session store's inbox task alive.
///
/// Dropping it stops event processing; hold it for the life of the app.
pub struct AuthSubscription {
    task: JoinHandle<()>,
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The current session plus the machinery that mutates it.
///
/// Cheaply cloneable; clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    auth: Arc<dyn AuthApi>,
    entitlement: EntitlementCache,
    current: RwLock<Option<Session>>,
    /// True from construction until the first event settles, and again
    /// while a sign-in or sign-out is in flight.
    loading: AtomicBool,
    events: mpsc::UnboundedSender<AuthEvent>,
    /// Events accepted into the inbox so far.
    pushed: AtomicU64,
    /// Bumped after every applied event; `wait_settled` parks on it.
    generation: watch::Sender<u64>,
}

impl SessionStore {
    /// Create the store and spawn its event inbox task.
    ///
    /// The store starts loading with no session; call [`Self::bootstrap`]
    /// to resolve the initial session.
    #[must_use]
    pub fn start(auth: Arc<dyn AuthApi>, entitlement: EntitlementCache) -> (Self, AuthSubscription) {
        let (events, mut inbox) = mpsc::unbounded_channel();
        let (generation, _) = watch::channel(0);
        let store = Self {
            inner: Arc::new(SessionInner {
                auth,
                entitlement,
                current: RwLock::new(None),
                loading: AtomicBool::new(true),
                events,
                pushed: AtomicU64::new(0),
                generation,
            }),
        };

        let task = {
            let store = store.clone();
            tokio::spawn(async move {
                while let Some(event) = inbox.recv().await {
                    store.apply_event(event).await;
                }
            })
        };

        (store, AuthSubscription { task })
    }

    /// Resolve the initial session from a persisted refresh token.
    ///
    /// A missing, expired, or rejected token resolves to "signed out";
    /// bootstrap itself never fails.
    pub async fn bootstrap(&self, stored_refresh: Option<&str>) {
        let event = match stored_refresh {
            None => AuthEvent::Initial(None),
            Some(token) => match self.inner.auth.refresh_session(token).await {
                Ok(session) => AuthEvent::Initial(Some(session)),
                Err(error) => {
                    info!(%error, "stored session could not be restored");
                    AuthEvent::Initial(None)
                }
            },
        };
        self.push(event);
    }

    /// Exchange email + password for a session.
    ///
    /// `Ok(())` means the exchange was accepted; the session lands via the
    /// event inbox, observable through [`Self::wait_settled`].
    ///
    /// # Errors
    ///
    /// Returns the auth service's rejection (bad credentials, transport).
    pub async fn login(&self, email: &Email, password: &str) -> Result<()> {
        self.inner.loading.store(true, Ordering::SeqCst);
        match self.inner.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.push(AuthEvent::SignedIn(session));
                Ok(())
            }
            Err(error) => {
                self.inner.loading.store(false, Ordering::SeqCst);
                Err(AppError::Auth(error))
            }
        }
    }

    /// Start a redirect-based OAuth sign-in.
    ///
    /// Returns the authorize URL to open; the resulting session must be
    /// delivered back via [`Self::complete_oauth`].
    ///
    /// # Errors
    ///
    /// Returns an error when the authorize URL cannot be built.
    pub fn login_with_oauth(&self, provider: OAuthProvider) -> Result<Url> {
        let url = self.inner.auth.authorize_url(provider).map_err(AppError::Auth)?;
        self.inner.loading.store(true, Ordering::SeqCst);
        Ok(url)
    }

    /// Deliver the session produced by a completed OAuth redirect.
    pub fn complete_oauth(&self, session: Session) {
        self.push(AuthEvent::SignedIn(session));
    }

    /// Sign out, revoking the current session if one exists.
    ///
    /// Local state is cleared even when revocation fails upstream.
    pub async fn logout(&self) {
        self.inner.loading.store(true, Ordering::SeqCst);
        let access_token = self
            .session()
            .map(|session| session.access_token);
        if let Some(token) = access_token {
            if let Err(error) = self.inner.auth.sign_out(&token).await {
                warn!(%error, "session revocation failed; clearing local state");
            }
        }
        self.push(AuthEvent::SignedOut);
    }

    /// Replace the current tokens without an identity change.
    pub fn apply_refreshed(&self, session: Session) {
        self.push(AuthEvent::TokenRefreshed(session));
    }

    /// Snapshot of the current session. Never blocks on I/O.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        match self.inner.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.session().map(|session| session.user.id)
    }

    /// Whether an auth resolution is still in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// Resolve the entitlement for the current identity inline.
    ///
    /// Event application spawns its premium fetch rather than blocking
    /// the inbox, so a caller about to act on `is_premium()` right after
    /// settling must resolve it inline instead of racing that fetch.
    pub async fn refresh_entitlement(&self) {
        self.inner.entitlement.refresh(self.current_user()).await;
    }

    /// Wait until no auth resolution is in flight and every accepted
    /// event has been applied.
    pub async fn wait_settled(&self) {
        let mut generation = self.inner.generation.subscribe();
        loop {
            let applied = *generation.borrow_and_update();
            if !self.is_loading() && applied >= self.inner.pushed.load(Ordering::SeqCst) {
                return;
            }
            if generation.changed().await.is_err() {
                return;
            }
        }
    }

    fn push(&self, event: AuthEvent) {
        // Count before sending so a settled check never observes the
        // event queued but uncounted.
        self.inner.pushed.fetch_add(1, Ordering::SeqCst);
        if self.inner.events.send(event).is_err() {
            warn!("auth inbox closed; event dropped");
        }
    }

    async fn apply_event(&self, event: AuthEvent) {
        if event.is_transition() {
            self.inner.loading.store(true, Ordering::SeqCst);
        }
        debug!(event = event.name(), "applying auth event");

        let user_id = {
            let session = event.session().cloned();
            let user_id = session.as_ref().map(|s| s.user.id);
            match self.inner.current.write() {
                Ok(mut guard) => *guard = session,
                Err(poisoned) => *poisoned.into_inner() = session,
            }
            user_id
        };

        // Claim the entitlement epoch here, in event order, so a slow
        // fetch spawned for an older event can never outrank a newer one.
        let ticket = self.inner.entitlement.begin();
        match user_id {
            Some(id) => {
                let entitlement = self.inner.entitlement.clone();
                tokio::spawn(async move { entitlement.resolve(ticket, Some(id)).await });
            }
            // No identity resolves without I/O; settle it before the
            // loading flag drops so gates observe `false` immediately.
            None => self.inner.entitlement.resolve(ticket, None).await,
        }

        self.inner.loading.store(false, Ordering::SeqCst);
        self.inner.generation.send_modify(|generation| *generation += 1);
    }
}
