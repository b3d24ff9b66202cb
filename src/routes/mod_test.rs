use super::*;
use crate::state::test_helpers::{test_app_state, test_app_state_with_media};

// =============================================================================
// Error mapping
// =============================================================================

#[test]
fn content_errors_map_to_status() {
    assert_eq!(content_error_to_status(&ContentError::NotFound("services")), StatusCode::NOT_FOUND);
    assert_eq!(content_error_to_status(&ContentError::EmptyPatch), StatusCode::BAD_REQUEST);
    let invalid = ContentError::Invalid { field: "title", reason: "too long" };
    assert_eq!(content_error_to_status(&invalid), StatusCode::BAD_REQUEST);
    let db = ContentError::Database(sqlx::Error::RowNotFound);
    assert_eq!(content_error_to_status(&db), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn account_errors_map_to_status() {
    assert_eq!(account_error_to_status(&AccountError::WeakPassword), StatusCode::BAD_REQUEST);
    assert_eq!(account_error_to_status(&AccountError::EmailTaken), StatusCode::CONFLICT);
    assert_eq!(account_error_to_status(&AccountError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    assert_eq!(account_error_to_status(&AccountError::Hash("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn media_errors_map_to_status() {
    assert_eq!(media_error_to_status(&MediaError::NotAnImage), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(media_error_to_status(&MediaError::TooLarge { limit: 1 }), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(media_error_to_status(&MediaError::Empty), StatusCode::BAD_REQUEST);
}

#[test]
fn client_errors_keep_message() {
    let err = ApiError::from(ContentError::NotFound("products"));
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, "products not found");
}

#[test]
fn server_errors_hide_details() {
    let err = ApiError::from(ContentError::Database(sqlx::Error::PoolTimedOut));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.message, "internal server error");
}

#[test]
fn api_error_response_status() {
    let resp = ApiError::new(StatusCode::FORBIDDEN, "nope").into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Router (requests that resolve before any database access)
// =============================================================================

async fn spawn(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn healthz_ok() {
    let base = spawn(test_app_state()).await;
    let resp = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let base = spawn(test_app_state()).await;
    let client = reqwest::Client::new();

    let session = client.get(format!("{base}/api/auth/session")).send().await.unwrap();
    assert_eq!(session.status(), reqwest::StatusCode::UNAUTHORIZED);

    let stats = client.get(format!("{base}/api/admin/stats")).send().await.unwrap();
    assert_eq!(stats.status(), reqwest::StatusCode::UNAUTHORIZED);

    let rpc = client
        .post(format!("{base}/api/rpc/has_role"))
        .json(&serde_json::json!({"user_id": uuid::Uuid::nil(), "role": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(rpc.status(), reqwest::StatusCode::UNAUTHORIZED);

    let create = client
        .post(format!("{base}/api/admin/services"))
        .json(&serde_json::json!({"title": "SEO"}))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status(), reqwest::StatusCode::UNAUTHORIZED);

    let upload = client
        .post(format!("{base}/api/admin/media?filename=logo.png"))
        .header("content-type", "image/png")
        .body(vec![1u8, 2, 3])
        .send()
        .await
        .unwrap();
    assert_eq!(upload.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sign_up_short_password_returns_error_body() {
    let base = spawn(test_app_state()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/auth/sign-up"))
        .json(&serde_json::json!({"email": "new@example.com", "password": "123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "password must be at least 6 characters");
}

#[tokio::test]
async fn sign_in_malformed_email_is_unauthorized() {
    let base = spawn(test_app_state()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/auth/sign-in"))
        .json(&serde_json::json!({"email": "not-an-email", "password": "whatever"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn media_files_served_from_media_dir() {
    let dir = std::env::temp_dir().join(format!("sitecms-serve-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("logos")).unwrap();
    std::fs::write(dir.join("logos/logo-1.png"), b"png-bytes").unwrap();

    let base = spawn(test_app_state_with_media(dir.clone())).await;
    let resp = reqwest::get(format!("{base}/media/logos/logo-1.png")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"png-bytes");

    let missing = reqwest::get(format!("{base}/media/logos/nope.png")).await.unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).unwrap();
}
