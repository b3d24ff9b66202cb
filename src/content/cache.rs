//! Read-through cache for public content queries.
//!
//! Entries are keyed `"{record-key}:{scope}"` (e.g. `services:active`).
//! Any write to a record type drops every entry under its record key, so a
//! public page never serves content older than the last admin save.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<RwLock<Entries>>,
}

#[derive(Default)]
struct Entries {
    values: HashMap<String, Arc<Value>>,
    /// Bumped by every invalidation of a record key. A load only stores its
    /// result if the generation it started under is still current.
    generations: HashMap<String, u64>,
}

impl Entries {
    fn generation(&self, record_key: &str) -> u64 {
        self.generations.get(record_key).copied().unwrap_or(0)
    }
}

fn record_key_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(record, _)| record)
}

#[must_use]
pub fn cache_key(record_key: &str, scope: &str) -> String {
    format!("{record_key}:{scope}")
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value or run `load` and cache its result.
    ///
    /// Load errors are returned and nothing is cached. A result loaded
    /// across an [`invalidate`](Self::invalidate) of the same record key is
    /// returned to this caller but not stored.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub async fn get_or_load<F, Fut, E>(&self, key: &str, load: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let record_key = record_key_of(key);
        let started = {
            let entries = self.inner.read().await;
            if let Some(hit) = entries.values.get(key) {
                return Ok(hit.clone());
            }
            entries.generation(record_key)
        };

        let value = Arc::new(load().await?);

        let mut entries = self.inner.write().await;
        if entries.generation(record_key) == started {
            entries.values.insert(key.to_owned(), value.clone());
        } else {
            tracing::debug!(key, "discarding content loaded before invalidation");
        }
        Ok(value)
    }

    /// Drop every cached query for one record type.
    pub async fn invalidate(&self, record_key: &str) {
        let prefix = format!("{record_key}:");
        let mut entries = self.inner.write().await;
        *entries.generations.entry(record_key.to_owned()).or_insert(0) += 1;

        let before = entries.values.len();
        entries.values.retain(|k, _| !k.starts_with(&prefix));
        let dropped = before - entries.values.len();
        if dropped > 0 {
            tracing::debug!(record_key, dropped, "content cache invalidated");
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.values.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
