//! Role membership backed by `user_roles`.

use sqlx::PgPool;
use uuid::Uuid;

pub async fn has_role(pool: &PgPool, user_id: Uuid, role: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)")
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await
}

/// Grant a role. Returns `false` when the user already had it.
pub async fn grant_role(pool: &PgPool, user_id: Uuid, role: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
