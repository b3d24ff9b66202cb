//! Auth routes: email/password sign-in, session inspection, role RPC.
//!
//! The session token travels either as the `session_token` cookie (browser
//! admin panel) or as `Authorization: Bearer` (API clients and the CLI).

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use super::ApiError;
use crate::auth::{ADMIN_ROLE, User};
use crate::services::{account, role, session};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

/// Bearer header first, then the session cookie.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn session_cookie(token: String, secure: bool, ttl_hours: u64) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::hours(i64::try_from(ttl_hours).unwrap_or(i64::MAX / 3600)))
        .build()
}

fn clear_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session validation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token })
    }
}

/// Authenticated user holding the admin role. Non-admins get 403.
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let app_state = AppState::from_ref(state);
        let is_admin = role::has_role(&app_state.pool, auth.user.id, ADMIN_ROLE)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "admin role check failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
        if !is_admin {
            tracing::warn!(user_id = %auth.user.id, "admin route denied");
            return Err(StatusCode::FORBIDDEN);
        }

        Ok(Self(auth))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: User,
}

/// `POST /api/auth/sign-up`: register an account.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let full_name = body.data.get("full_name").and_then(serde_json::Value::as_str);
    let user = account::sign_up(&state.pool, &body.email, &body.password, full_name).await?;
    if let Some(redirect_to) = &body.redirect_to {
        tracing::debug!(user_id = %user.id, %redirect_to, "sign-up redirect requested");
    }
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "user": user }))))
}

/// `POST /api/auth/sign-in`: verify credentials, set cookie, return the token.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user = account::authenticate(&state.pool, &body.email, &body.password).await?;
    let token = session::create_session(&state.pool, user.id, state.config.session_ttl_hours).await?;
    tracing::info!(user_id = %user.id, "signed in");

    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.cookie_secure,
        state.config.session_ttl_hours,
    ));
    Ok((jar, Json(SessionResponse { access_token: token, user })))
}

/// `POST /api/auth/sign-out`: delete session, clear cookie.
pub async fn sign_out(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed");
    }

    let jar = CookieJar::new().add(clear_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/session`: current session, 401 when there is none.
pub async fn session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse { access_token: auth.token, user: auth.user })
}

#[derive(Debug, Deserialize)]
pub struct HasRoleBody {
    pub user_id: Uuid,
    pub role: String,
}

/// `POST /api/rpc/has_role`: `{result}`; other users' roles are admin-only.
pub async fn has_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<HasRoleBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.user_id != auth.user.id && !role::has_role(&state.pool, auth.user.id, ADMIN_ROLE).await? {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "cannot query another user's roles"));
    }

    let result = role::has_role(&state.pool, body.user_id, &body.role).await?;
    Ok(Json(serde_json::json!({ "result": result })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
