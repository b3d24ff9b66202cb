//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the JSON API for the public marketing site, the
//! auth endpoints the admin panel signs in through, the admin CRUD surface,
//! and uploaded media as static files under `/media`.
//!
//! ERROR HANDLING
//! ==============
//! Handlers return [`ApiError`], rendered as `{"error": "..."}` with the
//! mapped status. Server-side failures are logged and reported with a
//! generic message.

pub mod admin;
pub mod auth;
pub mod media;
pub mod public;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::records::{
    AboutContent, ContactMessage, HomepageContent, MenuSetting, PortfolioItem, Product, Service, SiteSettings,
};
use crate::content::{Collection, ContentError, Singleton};
use crate::services::account::AccountError;
use crate::services::media::MediaError;
use crate::state::AppState;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    fn internal(err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub(crate) fn content_error_to_status(err: &ContentError) -> StatusCode {
    match err {
        ContentError::NotFound(_) => StatusCode::NOT_FOUND,
        ContentError::Invalid { .. } | ContentError::EmptyPatch => StatusCode::BAD_REQUEST,
        ContentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn account_error_to_status(err: &AccountError) -> StatusCode {
    match err {
        AccountError::InvalidEmail | AccountError::WeakPassword => StatusCode::BAD_REQUEST,
        AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::Hash(_) | AccountError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn media_error_to_status(err: &MediaError) -> StatusCode {
    match err {
        MediaError::NotAnImage => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        MediaError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        MediaError::Empty => StatusCode::BAD_REQUEST,
        MediaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn from_status(status: StatusCode, err: &dyn std::fmt::Display) -> ApiError {
    if status.is_server_error() {
        ApiError::internal(err)
    } else {
        ApiError::new(status, err.to_string())
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        from_status(content_error_to_status(&err), &err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        from_status(account_error_to_status(&err), &err)
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        from_status(media_error_to_status(&err), &err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(&err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(&err)
    }
}

// =============================================================================
// ROUTER
// =============================================================================

fn admin_collection<T: Collection>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(admin::list_records::<T>).post(admin::create_record::<T>))
        .route(
            &format!("{base}/{{id}}"),
            patch(admin::update_record::<T>).delete(admin::delete_record::<T>),
        )
}

fn admin_singleton<T: Singleton>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router.route(path, get(admin::get_singleton::<T>).put(admin::save_singleton::<T>))
}

fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    let router = Router::new()
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/menus", get(admin::list_records::<MenuSetting>))
        .route("/api/admin/menus/{id}", patch(admin::update_record::<MenuSetting>))
        .route("/api/admin/messages", get(admin::list_records::<ContactMessage>))
        .route("/api/admin/messages/{id}", delete(admin::delete_record::<ContactMessage>))
        .route("/api/admin/messages/{id}/read", post(admin::mark_message_read))
        .route(
            "/api/admin/media",
            post(media::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        );

    let router = admin_collection::<Service>(router, "/api/admin/services");
    let router = admin_collection::<PortfolioItem>(router, "/api/admin/portfolio");
    let router = admin_collection::<Product>(router, "/api/admin/products");
    let router = admin_singleton::<SiteSettings>(router, "/api/admin/site-settings");
    let router = admin_singleton::<HomepageContent>(router, "/api/admin/homepage");
    admin_singleton::<AboutContent>(router, "/api/admin/about")
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/public/site-settings", get(public::singleton::<SiteSettings>))
        .route("/api/public/homepage", get(public::singleton::<HomepageContent>))
        .route("/api/public/about", get(public::singleton::<AboutContent>))
        .route("/api/public/services", get(public::collection::<Service>))
        .route("/api/public/portfolio", get(public::collection::<PortfolioItem>))
        .route("/api/public/products", get(public::collection::<Product>))
        .route("/api/public/menus", get(public::collection::<MenuSetting>))
        .route("/api/public/contact", post(public::submit_contact))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let media_dir = state.config.media_dir.clone();

    Router::new()
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/session", get(auth::session))
        .route("/api/rpc/has_role", post(auth::has_role))
        .merge(public_routes())
        .merge(admin_routes(state.config.max_upload_bytes))
        .route("/healthz", get(healthz))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
