//! Session/role reconciliation.
//!
//! DESIGN
//! ======
//! Every session change mints a new generation number. Role lookups are
//! spawned with the generation current at their start and may only write
//! back while that generation is still current, so the last session change
//! *issued* wins regardless of which lookup *completes* last.
//!
//! The generation counter is only touched inside the `watch::Sender`
//! modify closures. That makes mint-and-write and compare-and-apply atomic
//! with respect to each other on the multi-threaded runtime too.
//!
//! TRADE-OFFS
//! ==========
//! Superseded lookups are not aborted at the transport level; they run to
//! completion and their result is dropped. Without a configured timeout a
//! hung lookup keeps `loading = true` until a later session change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ADMIN_ROLE, IdentityError, IdentityProvider, RoleLookup, Session, SignUpOptions, User};

// =============================================================================
// STATE
// =============================================================================

/// Reconciled auth view exposed to consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerState {
    pub session: Option<Session>,
    pub user: Option<User>,
    pub is_admin: bool,
    pub loading: bool,
}

impl ReconcilerState {
    /// State before the first session change has been processed.
    #[must_use]
    pub fn initial() -> Self {
        Self { session: None, user: None, is_admin: false, loading: true }
    }
}

/// Optional behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerOptions {
    /// Force a generation to non-admin if its lookup takes longer than this.
    pub role_check_timeout: Option<Duration>,
    /// Redirect target passed along with sign-up requests.
    pub sign_up_redirect: Option<String>,
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Owns the `(session, user, is_admin, loading)` view. Cheap to clone.
#[derive(Clone)]
pub struct SessionReconciler {
    inner: Arc<Inner>,
}

struct Inner {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<dyn RoleLookup>,
    state: watch::Sender<ReconcilerState>,
    generation: AtomicU64,
    inert: AtomicBool,
    options: ReconcilerOptions,
}

impl SessionReconciler {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, roles: Arc<dyn RoleLookup>) -> Self {
        Self::with_options(identity, roles, ReconcilerOptions::default())
    }

    #[must_use]
    pub fn with_options(
        identity: Arc<dyn IdentityProvider>,
        roles: Arc<dyn RoleLookup>,
        options: ReconcilerOptions,
    ) -> Self {
        let (state, _) = watch::channel(ReconcilerState::initial());
        Self {
            inner: Arc::new(Inner {
                identity,
                roles,
                state,
                generation: AtomicU64::new(0),
                inert: AtomicBool::new(false),
                options,
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ReconcilerState> {
        self.inner.state.subscribe()
    }

    /// Most recently minted generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to provider session changes, then fetch the current session.
    ///
    /// Both paths feed [`Self::handle_session_change`]. Dropping the returned
    /// subscription unsubscribes and makes this reconciler inert.
    pub fn initialize(&self) -> AuthSubscription {
        let mut changes = self.inner.identity.subscribe();

        let listener = {
            let this = self.clone();
            tokio::spawn(async move {
                loop {
                    match changes.recv().await {
                        Ok(session) => {
                            this.handle_session_change(session);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session change stream lagged; refetching current session");
                            this.load_current_session().await;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        };

        let initial = {
            let this = self.clone();
            tokio::spawn(async move { this.load_current_session().await })
        };

        AuthSubscription { reconciler: self.clone(), listener, initial }
    }

    async fn load_current_session(&self) {
        match self.inner.identity.get_current_session().await {
            Ok(session) => {
                self.handle_session_change(session);
            }
            Err(e) => warn!(error = %e, "initial session fetch failed"),
        }
    }

    /// Apply a session change.
    ///
    /// `session` and `user` are written before this returns. When the
    /// session carries a user the role lookup runs on a spawned task whose
    /// handle is returned; its result is applied only if no newer session
    /// change or sign-out has happened by the time it completes.
    pub fn handle_session_change(&self, session: Option<Session>) -> Option<JoinHandle<()>> {
        if self.inner.inert.load(Ordering::SeqCst) {
            return None;
        }

        let user = session.as_ref().and_then(|s| s.user.clone());
        let mut token = 0;
        self.inner.state.send_modify(|state| {
            token = self.mint();
            state.session = session;
            state.user.clone_from(&user);
            if user.is_some() {
                state.loading = true;
            } else {
                state.is_admin = false;
                state.loading = false;
            }
        });

        let user = user?;
        debug!(generation = token, user_id = %user.id, "role lookup started");

        let this = self.clone();
        Some(tokio::spawn(async move {
            let is_admin = this.lookup_admin(user.id).await;
            this.apply_role_result(token, is_admin);
        }))
    }

    fn mint(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    async fn lookup_admin(&self, user_id: Uuid) -> bool {
        let lookup = self.inner.roles.has_role(user_id, ADMIN_ROLE);
        let result = match self.inner.options.role_check_timeout {
            Some(limit) => {
                if let Ok(result) = tokio::time::timeout(limit, lookup).await {
                    result
                } else {
                    warn!(%user_id, timeout_ms = limit.as_millis(), "role lookup timed out; treating as non-admin");
                    return false;
                }
            }
            None => lookup.await,
        };

        match result {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(error = %e, %user_id, "role lookup failed; treating as non-admin");
                false
            }
        }
    }

    /// Write a lookup result if `token` is still the current generation.
    fn apply_role_result(&self, token: u64, is_admin: bool) -> bool {
        self.inner.state.send_if_modified(|state| {
            let current = self.inner.generation.load(Ordering::SeqCst);
            if self.inner.inert.load(Ordering::SeqCst) || current != token {
                debug!(generation = token, current, "discarding superseded role lookup");
                return false;
            }
            state.is_admin = is_admin;
            state.loading = false;
            true
        })
    }

    /// Sign in with email and password.
    ///
    /// `loading` goes true before the call so a guard watching the state
    /// never sees "resolved, no user" in between. On success it stays true
    /// until the resulting session change resolves.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; `loading` is reset to false first.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        self.set_loading(true);
        if let Err(e) = self.inner.identity.sign_in_with_password(email, password).await {
            self.set_loading(false);
            return Err(e);
        }
        Ok(())
    }

    /// Register a new account. Does not touch `is_admin` or `loading`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged.
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<(), IdentityError> {
        let mut metadata = serde_json::Map::new();
        metadata.insert("full_name".into(), serde_json::Value::String(display_name.to_owned()));
        let options = SignUpOptions { redirect_to: self.inner.options.sign_up_redirect.clone(), metadata };
        self.inner.identity.sign_up(email, password, options).await
    }

    /// Sign out. Any in-flight role lookup is invalidated before the
    /// provider call, and `is_admin` drops to false immediately.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; local state is already non-admin.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        self.inner.state.send_modify(|state| {
            self.mint();
            state.is_admin = false;
        });
        self.inner.identity.sign_out().await
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_if_modified(|state| {
            if state.loading == loading {
                return false;
            }
            state.loading = loading;
            true
        });
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Teardown handle returned by [`SessionReconciler::initialize`].
#[must_use = "dropping the subscription tears the reconciler down"]
pub struct AuthSubscription {
    reconciler: SessionReconciler,
    listener: JoinHandle<()>,
    initial: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stop listening for session changes and make the reconciler inert.
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.reconciler.inner.inert.store(true, Ordering::SeqCst);
        self.listener.abort();
        self.initial.abort();
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
