//! Admin CRUD routes.
//!
//! Handlers are generic over the record traits so each content type gets
//! the same list/create/update/delete surface. Every write drops the cached
//! public reads for that record type.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::ApiError;
use super::auth::AdminUser;
use crate::content::records::{ContactMessage, ContactMessagePatch};
use crate::content::{Collection, Record, Singleton, repo};
use crate::services::stats::{self, AdminStats};
use crate::state::AppState;

/// Every row including inactive ones.
pub async fn list_records<T: Collection>(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<T>>, ApiError> {
    Ok(Json(repo::list_all::<T>(&state.pool).await?))
}

pub async fn create_record<T: Collection>(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(draft): Json<T::Draft>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    let row = repo::create::<T>(&state.pool, draft).await?;
    state.cache.invalidate(T::KEY).await;
    tracing::info!(record = T::KEY, user_id = %admin.user.id, "record created");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_record<T: Collection>(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<T::Patch>,
) -> Result<Json<T>, ApiError> {
    let row = repo::update::<T>(&state.pool, id, patch).await?;
    state.cache.invalidate(T::KEY).await;
    tracing::info!(record = T::KEY, %id, user_id = %admin.user.id, "record updated");
    Ok(Json(row))
}

pub async fn delete_record<T: Collection>(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo::delete::<T>(&state.pool, id).await?;
    state.cache.invalidate(T::KEY).await;
    tracing::info!(record = T::KEY, %id, user_id = %admin.user.id, "record deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn get_singleton<T: Singleton>(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Option<T>>, ApiError> {
    Ok(Json(repo::get_singleton::<T>(&state.pool).await?))
}

pub async fn save_singleton<T: Singleton>(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(patch): Json<T::Patch>,
) -> Result<Json<T>, ApiError> {
    let row = repo::save_singleton::<T>(&state.pool, patch).await?;
    state.cache.invalidate(T::KEY).await;
    tracing::info!(record = T::KEY, user_id = %admin.user.id, "singleton saved");
    Ok(Json(row))
}

/// `POST /api/admin/messages/{id}/read`
pub async fn mark_message_read(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessage>, ApiError> {
    let patch = ContactMessagePatch { is_read: Some(true) };
    let row = repo::update::<ContactMessage>(&state.pool, id, patch).await?;
    state.cache.invalidate(ContactMessage::KEY).await;
    Ok(Json(row))
}

/// `GET /api/admin/stats`
pub async fn stats(_admin: AdminUser, State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(stats::admin_stats(&state.pool).await?))
}
