//! Public read API for the marketing site, plus the contact form.
//!
//! Reads go through the shared [`QueryCache`](crate::content::QueryCache);
//! only active rows of collections are visible here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use super::ApiError;
use crate::content::cache::cache_key;
use crate::content::records::{ContactMessage, NewContactMessage};
use crate::content::{Collection, Record, Singleton, repo};
use crate::state::AppState;

pub(crate) const ACTIVE_SCOPE: &str = "active";
pub(crate) const CURRENT_SCOPE: &str = "current";

/// `GET /api/public/{collection}`: active rows in display order.
pub async fn collection<T: Collection>(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let pool = state.pool.clone();
    let value = state
        .cache
        .get_or_load(&cache_key(T::KEY, ACTIVE_SCOPE), || async move {
            let rows = repo::list_active::<T>(&pool).await?;
            Ok::<_, ApiError>(serde_json::to_value(rows)?)
        })
        .await?;
    Ok(Json(Value::clone(&value)))
}

/// `GET /api/public/{singleton}`: the row, or `null` before it is created.
pub async fn singleton<T: Singleton>(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let pool = state.pool.clone();
    let value = state
        .cache
        .get_or_load(&cache_key(T::KEY, CURRENT_SCOPE), || async move {
            let row = repo::get_singleton::<T>(&pool).await?;
            Ok::<_, ApiError>(serde_json::to_value(row)?)
        })
        .await?;
    Ok(Json(Value::clone(&value)))
}

/// `POST /api/public/contact`: store a visitor message for the admin inbox.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(body): Json<NewContactMessage>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let message = repo::create::<ContactMessage>(&state.pool, body).await?;
    state.cache.invalidate(ContactMessage::KEY).await;
    tracing::info!(message_id = %message.id, "contact message received");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
}
