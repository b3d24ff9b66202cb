//! Generic repository operations over [`Record`] types.
//!
//! ERROR HANDLING
//! ==============
//! Missing rows map to `ContentError::NotFound(T::KEY)` so route handlers
//! can answer 404 without knowing which table was queried.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Collection, ContentError, FieldValue, Fields, Record, Singleton, push_value};

// =============================================================================
// STATEMENT BUILDERS
// =============================================================================

pub(crate) fn insert_statement<'a>(
    table: &str,
    returning: &str,
    fields: Vec<(&'static str, FieldValue)>,
) -> QueryBuilder<'a, Postgres> {
    if fields.is_empty() {
        return QueryBuilder::new(format!("INSERT INTO {table} DEFAULT VALUES RETURNING {returning}"));
    }

    let columns = fields.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ");
    let mut qb = QueryBuilder::new(format!("INSERT INTO {table} ({columns}) VALUES ("));
    for (i, (_, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING ");
    qb.push(returning);
    qb
}

pub(crate) fn update_statement<'a>(
    table: &str,
    returning: &str,
    id: Uuid,
    fields: Vec<(&'static str, FieldValue)>,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {table} SET "));
    for (column, value) in fields {
        qb.push(column);
        qb.push(" = ");
        push_value(&mut qb, value);
        qb.push(", ");
    }
    qb.push("updated_at = now() WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING ");
    qb.push(returning);
    qb
}

fn select_sql<T: Record>(tail: &str) -> String {
    format!("SELECT {} FROM {} {tail}", T::COLUMNS, T::TABLE)
}

// =============================================================================
// READS
// =============================================================================

/// Every row, in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_all<T: Collection>(pool: &PgPool) -> Result<Vec<T>, ContentError> {
    let sql = select_sql::<T>(&format!("ORDER BY {}", T::ORDER_BY));
    Ok(sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?)
}

/// Rows visible on the public site, in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active<T: Collection>(pool: &PgPool) -> Result<Vec<T>, ContentError> {
    let Some(active) = T::ACTIVE_COLUMN else {
        return list_all::<T>(pool).await;
    };
    let sql = select_sql::<T>(&format!("WHERE {active} = true ORDER BY {}", T::ORDER_BY));
    Ok(sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?)
}

/// Fetch one row by id.
///
/// # Errors
///
/// Returns `NotFound` if no row has this id.
pub async fn get<T: Record>(pool: &PgPool, id: Uuid) -> Result<T, ContentError> {
    let sql = select_sql::<T>("WHERE id = $1");
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(T::KEY))
}

/// Count rows, optionally filtered on one boolean column.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn count<T: Record>(pool: &PgPool, filter: Option<(&'static str, bool)>) -> Result<i64, ContentError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
    if let Some((column, value)) = filter {
        qb.push(format!(" WHERE {column} = "));
        qb.push_bind(value);
    }
    Ok(qb.build_query_scalar::<i64>().fetch_one(pool).await?)
}

// =============================================================================
// WRITES
// =============================================================================

/// Validate and insert a new row.
///
/// # Errors
///
/// Returns `Invalid` for rejected drafts, or a database error.
pub async fn create<T: Collection>(pool: &PgPool, draft: T::Draft) -> Result<T, ContentError> {
    draft.validate()?;
    let mut qb = insert_statement(T::TABLE, T::COLUMNS, draft.into_fields());
    Ok(qb.build_query_as::<T>().fetch_one(pool).await?)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `Invalid`, `EmptyPatch` when no field was provided, or
/// `NotFound` if the row does not exist.
pub async fn update<T: Collection>(pool: &PgPool, id: Uuid, patch: T::Patch) -> Result<T, ContentError> {
    patch.validate()?;
    let fields = patch.into_fields();
    if fields.is_empty() {
        return Err(ContentError::EmptyPatch);
    }
    let mut qb = update_statement(T::TABLE, T::COLUMNS, id, fields);
    qb.build_query_as::<T>()
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(T::KEY))
}

/// Delete one row.
///
/// # Errors
///
/// Returns `NotFound` if nothing was deleted.
pub async fn delete<T: Record>(pool: &PgPool, id: Uuid) -> Result<(), ContentError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::TABLE))
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContentError::NotFound(T::KEY));
    }
    Ok(())
}

// =============================================================================
// SINGLETONS
// =============================================================================

/// The single row, if it has been created.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_singleton<T: Singleton>(pool: &PgPool) -> Result<Option<T>, ContentError> {
    let sql = select_sql::<T>("ORDER BY id LIMIT 1");
    Ok(sqlx::query_as::<_, T>(&sql).fetch_optional(pool).await?)
}

/// Update the single row, creating it first when the type allows.
///
/// # Errors
///
/// Returns `Invalid`, or `NotFound` when the row is missing and the type
/// is update-only.
pub async fn save_singleton<T: Singleton>(pool: &PgPool, patch: T::Patch) -> Result<T, ContentError> {
    patch.validate()?;
    let fields = patch.into_fields();

    let existing: Option<Uuid> = sqlx::query_scalar(&format!("SELECT id FROM {} ORDER BY id LIMIT 1", T::TABLE))
        .fetch_optional(pool)
        .await?;

    match existing {
        Some(id) if fields.is_empty() => get::<T>(pool, id).await,
        Some(id) => {
            let mut qb = update_statement(T::TABLE, T::COLUMNS, id, fields);
            Ok(qb.build_query_as::<T>().fetch_one(pool).await?)
        }
        None if T::CREATE_IF_MISSING => {
            let mut qb = insert_statement(T::TABLE, T::COLUMNS, fields);
            Ok(qb.build_query_as::<T>().fetch_one(pool).await?)
        }
        None => Err(ContentError::NotFound(T::KEY)),
    }
}

#[cfg(test)]
#[path = "repo_test.rs"]
mod tests;
