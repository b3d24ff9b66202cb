//! HTTP identity provider and role lookup backed by the site's auth API.
//!
//! Holds the bearer token in memory and broadcasts a session change after
//! every sign-in, sign-out, and explicit refresh, the same way a hosted
//! auth SDK notifies its listeners.

use std::sync::Mutex;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{IdentityError, IdentityProvider, RoleLookup, RoleLookupError, Session, SignUpOptions, User};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    user: User,
}

impl From<SessionResponse> for Session {
    fn from(resp: SessionResponse) -> Self {
        Self { access_token: resp.access_token, user: Some(resp.user) }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RoleResponse {
    result: bool,
}

pub struct HttpIdentity {
    client: reqwest::Client,
    base_url: String,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<Option<Session>>,
}

impl HttpIdentity {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            session: Mutex::new(None),
            events,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
    }

    fn store(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.session.lock() {
            guard.clone_from(&session);
        }
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(session);
    }

    /// Re-validate the held token and broadcast the result as a session change.
    ///
    /// # Errors
    ///
    /// Returns a transport or protocol error; the held session is untouched.
    pub async fn refresh(&self) -> Result<Option<Session>, IdentityError> {
        let session = self.get_current_session().await?;
        self.store(session.clone());
        Ok(session)
    }
}

async fn rejection(resp: reqwest::Response) -> IdentityError {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(body) => IdentityError::Rejected(body.error),
        Err(_) => IdentityError::Protocol(format!("status {status}")),
    }
}

fn transport(e: reqwest::Error) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentity {
    fn subscribe(&self) -> broadcast::Receiver<Option<Session>> {
        self.events.subscribe()
    }

    async fn get_current_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };

        let resp = self
            .client
            .get(self.url("/api/auth/session"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => {
                let body = resp
                    .json::<SessionResponse>()
                    .await
                    .map_err(|e| IdentityError::Protocol(e.to_string()))?;
                Ok(Some(body.into()))
            }
            _ => Err(rejection(resp).await),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let resp = self
            .client
            .post(self.url("/api/auth/sign-in"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        let body = resp
            .json::<SessionResponse>()
            .await
            .map_err(|e| IdentityError::Protocol(e.to_string()))?;
        self.store(Some(body.into()));
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str, options: SignUpOptions) -> Result<(), IdentityError> {
        let resp = self
            .client
            .post(self.url("/api/auth/sign-up"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "redirect_to": options.redirect_to,
                "data": options.metadata,
            }))
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let token = self.access_token();
        self.store(None);

        let Some(token) = token else {
            return Ok(());
        };
        let resp = self
            .client
            .post(self.url("/api/auth/sign-out"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(rejection(resp).await)
        }
    }
}

#[async_trait::async_trait]
impl RoleLookup for HttpIdentity {
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, RoleLookupError> {
        let token = self
            .access_token()
            .ok_or_else(|| RoleLookupError::Denied("no session".into()))?;

        let resp = self
            .client
            .post(self.url("/api/rpc/has_role"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "user_id": user_id, "role": role }))
            .send()
            .await
            .map_err(|e| RoleLookupError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RoleLookupError::Denied(status.to_string()));
        }
        if !status.is_success() {
            return Err(RoleLookupError::Transport(format!("status {status}")));
        }

        let body = resp
            .json::<RoleResponse>()
            .await
            .map_err(|e| RoleLookupError::Transport(e.to_string()))?;
        Ok(body.result)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
