//! Editable site content: typed records and a generic repository over them.
//!
//! DESIGN
//! ======
//! Each record type declares its table, selected columns, and an explicit
//! field schema for writes (`Fields` yields `(column, FieldValue)` pairs).
//! The repository builds insert/update statements from those pairs, so the
//! same list/create/update/delete code serves every content type without
//! loosely-typed payloads.
//!
//! Collections (services, portfolio, ...) have many rows ordered by
//! `sort_order`; singletons (site settings, homepage, about) have one.

pub mod cache;
pub mod records;
pub mod repo;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Postgres, QueryBuilder};

pub use cache::QueryCache;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
    #[error("nothing to update")]
    EmptyPatch,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// FIELD SCHEMA
// =============================================================================

/// A single column value written by insert/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    NullableText(Option<String>),
    Int(i32),
    Bool(bool),
    List(Vec<String>),
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(clean_list(v))
    }
}

/// Optional text column: blank input clears it to NULL.
#[must_use]
pub fn nullable(v: Option<String>) -> FieldValue {
    FieldValue::NullableText(v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()))
}

/// Trim list entries and drop the empty ones.
#[must_use]
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Text(v) => qb.push_bind(v),
        FieldValue::NullableText(v) => qb.push_bind(v),
        FieldValue::Int(v) => qb.push_bind(v),
        FieldValue::Bool(v) => qb.push_bind(v),
        FieldValue::List(v) => qb.push_bind(v),
    };
}

/// Write payload for a record: validated, then flattened to columns.
pub trait Fields {
    /// Reject payloads that would store unusable rows.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] naming the offending field.
    fn validate(&self) -> Result<(), ContentError> {
        Ok(())
    }

    /// Columns to write. Patches yield only the fields that were provided.
    fn into_fields(self) -> Vec<(&'static str, FieldValue)>;
}

/// Collect the provided patch fields.
pub(crate) fn patch_field<T: Into<FieldValue>>(
    out: &mut Vec<(&'static str, FieldValue)>,
    column: &'static str,
    value: Option<T>,
) {
    if let Some(v) = value {
        out.push((column, v.into()));
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::Invalid { field, reason: "must not be empty" });
    }
    Ok(())
}

pub(crate) fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ContentError> {
    if value.chars().count() > max {
        return Err(ContentError::Invalid { field, reason: "too long" });
    }
    Ok(())
}

// =============================================================================
// RECORD TRAITS
// =============================================================================

/// A row type stored in one table.
pub trait Record: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Cache key prefix and human-readable name.
    const KEY: &'static str;
    /// Select list, may contain expressions aliased to field names.
    const COLUMNS: &'static str;
}

/// A multi-row record type with create/update/delete.
pub trait Collection: Record {
    const ORDER_BY: &'static str = "sort_order ASC, id ASC";
    /// Boolean column that hides rows from public listings.
    const ACTIVE_COLUMN: Option<&'static str> = Some("is_active");

    type Draft: Fields + DeserializeOwned + Send;
    type Patch: Fields + DeserializeOwned + Send;
}

/// A record type with exactly one row.
pub trait Singleton: Record {
    /// Insert the row on first save instead of reporting it missing.
    const CREATE_IF_MISSING: bool;

    type Patch: Fields + DeserializeOwned + Send;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
