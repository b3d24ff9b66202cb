use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn cache_key_joins_record_and_scope() {
    assert_eq!(cache_key("services", "active"), "services:active");
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let cache = QueryCache::new();
    let loads = AtomicUsize::new(0);

    for _ in 0..3 {
        let value = cache
            .get_or_load("services:active", || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(serde_json::json!([{"title": "SEO"}]))
            })
            .await
            .unwrap();
        assert_eq!(value[0]["title"], "SEO");
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn failed_load_is_not_cached() {
    let cache = QueryCache::new();
    let err = cache
        .get_or_load("products:active", || async { Err::<Value, _>("db down") })
        .await
        .unwrap_err();
    assert_eq!(err, "db down");
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn invalidate_drops_only_matching_record_type() {
    let cache = QueryCache::new();
    for key in ["services:active", "services:all", "site-settings:current", "services-extra:active"] {
        cache
            .get_or_load(key, || async { Ok::<_, ()>(Value::Null) })
            .await
            .unwrap();
    }

    cache.invalidate("services").await;

    assert_eq!(cache.len().await, 2);
    let reloaded = AtomicUsize::new(0);
    cache
        .get_or_load("services:active", || async {
            reloaded.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(Value::Bool(true))
        })
        .await
        .unwrap();
    assert_eq!(reloaded.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clones_share_entries() {
    let cache = QueryCache::new();
    let other = cache.clone();
    cache
        .get_or_load("about-content:current", || async { Ok::<_, ()>(Value::Null) })
        .await
        .unwrap();
    assert_eq!(other.len().await, 1);
    other.invalidate("about-content").await;
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn load_spanning_invalidate_is_not_stored() {
    let cache = QueryCache::new();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let reader = {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .get_or_load("services:active", || async move {
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    Ok::<_, ()>(serde_json::json!("old"))
                })
                .await
                .unwrap()
        })
    };

    started_rx.await.unwrap();
    cache.invalidate("services").await;
    release_tx.send(()).unwrap();

    // The slow reader still gets its own result back.
    assert_eq!(*reader.await.unwrap(), serde_json::json!("old"));
    assert!(cache.is_empty().await);

    let fresh = cache
        .get_or_load("services:active", || async { Ok::<_, ()>(serde_json::json!("new")) })
        .await
        .unwrap();
    assert_eq!(*fresh, serde_json::json!("new"));
}

#[tokio::test]
async fn invalidating_other_record_keeps_concurrent_load() {
    let cache = QueryCache::new();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let reader = {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .get_or_load("products:active", || async move {
                    let _ = release_rx.await;
                    Ok::<_, ()>(Value::Bool(true))
                })
                .await
                .unwrap()
        })
    };

    tokio::task::yield_now().await;
    cache.invalidate("services").await;
    release_tx.send(()).unwrap();
    reader.await.unwrap();

    assert_eq!(cache.len().await, 1);
}
