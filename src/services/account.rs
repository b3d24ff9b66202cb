//! Email/password accounts.
//!
//! Passwords are stored as argon2 PHC strings with a random salt. Emails are
//! normalized to lowercase before every lookup and insert.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use sqlx::{PgPool, Row};

use crate::auth::User;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

pub(crate) fn hash_password(password: &str) -> Result<String, AccountError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AccountError::Hash(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AccountError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
    }
}

/// Register a new account. `full_name` falls back to the email's local part.
///
/// # Errors
///
/// Rejects malformed emails, short passwords, and already-registered emails.
pub async fn sign_up(
    pool: &PgPool,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<User, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }
    let display_name = full_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| name_from_email(&email), str::to_owned);
    let password_hash = hash_password(password)?;

    let row = sqlx::query(
        r"INSERT INTO users (email, password_hash, display_name)
          VALUES ($1, $2, $3)
          ON CONFLICT (email) DO NOTHING
          RETURNING id, email, display_name",
    )
    .bind(&email)
    .bind(password_hash)
    .bind(display_name)
    .fetch_optional(pool)
    .await?;

    let user = row.as_ref().map(user_from_row).ok_or(AccountError::EmailTaken)?;
    tracing::info!(user_id = %user.id, "account created");
    Ok(user)
}

/// Check an email/password pair.
///
/// # Errors
///
/// Unknown emails and wrong passwords both yield `InvalidCredentials`.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;
    let row = sqlx::query("SELECT id, email, display_name, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    let hash: String = row.get("password_hash");
    if !verify_password(&hash, password) {
        return Err(AccountError::InvalidCredentials);
    }
    Ok(user_from_row(&row))
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AccountError> {
    let Some(email) = normalize_email(email) else {
        return Ok(None);
    };
    let row = sqlx::query("SELECT id, email, display_name FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(user_from_row))
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
