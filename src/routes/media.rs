//! Logo upload route.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;

use super::ApiError;
use super::auth::AdminUser;
use crate::services::media::{self, StoredMedia};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// `POST /api/admin/media?filename=logo.png`: raw image body.
pub async fn upload(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredMedia>), ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let stored = media::store_logo(
        &state.config.media_dir,
        &state.config.public_base_url,
        content_type,
        query.filename.as_deref(),
        &body,
        state.config.max_upload_bytes,
    )
    .await?;
    tracing::info!(user_id = %admin.user.id, path = %stored.path, "media uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}
