//! Client-side auth state: who is signed in and whether they are an admin.
//!
//! SYSTEM CONTEXT
//! ==============
//! The admin panel and the `whoami` CLI command read a single reconciled
//! view of the current session. Identity and role checks are remote calls
//! behind the [`IdentityProvider`] and [`RoleLookup`] traits so the
//! reconciler can be driven by the HTTP client in production and by mocks
//! in tests.

pub mod gate;
pub mod http;
pub mod reconciler;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub use gate::{GateDecision, admin_gate};
pub use reconciler::{AuthSubscription, ReconcilerState, SessionReconciler};

/// Role name checked to grant admin panel access.
pub const ADMIN_ROLE: &str = "admin";

// =============================================================================
// TYPES
// =============================================================================

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Provider-issued proof of authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Extra data sent with a registration request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpOptions {
    /// Where the confirmation flow should send the user afterwards.
    pub redirect_to: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Identity-provider failures. Returned to callers as values for display.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    Rejected(String),
    #[error("identity request failed: {0}")]
    Transport(String),
    #[error("unexpected identity response: {0}")]
    Protocol(String),
}

/// Role-lookup failures. Never surfaced past the reconciler.
#[derive(Debug, thiserror::Error)]
pub enum RoleLookupError {
    #[error("role lookup request failed: {0}")]
    Transport(String),
    #[error("role lookup denied: {0}")]
    Denied(String),
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Sign-in/sign-up/sign-out plus a stream of session changes.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to session changes (sign-in, sign-out, refresh).
    fn subscribe(&self) -> broadcast::Receiver<Option<Session>>;

    /// Fetch the session the provider currently holds, if any.
    async fn get_current_session(&self) -> Result<Option<Session>, IdentityError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    async fn sign_up(&self, email: &str, password: &str, options: SignUpOptions) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Remote check of whether a user holds a named role.
#[async_trait::async_trait]
pub trait RoleLookup: Send + Sync {
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, RoleLookupError>;
}
