//! The same scenarios run against every store kind.

use requestor_store::{CacheStore, FileStorage, MemoryStorage, MemoryStore, StorageStore};
use serde_json::{json, Value};
use std::time::Duration;

async fn set_get_delete(store: &dyn CacheStore<Value>) {
    assert!(!store.has("a").await);
    assert_eq!(store.get("a").await, None);

    store.set("a", json!({"n": 1}), None).await;
    assert!(store.has("a").await);
    assert_eq!(store.get("a").await, Some(json!({"n": 1})));

    store.set("a", json!({"n": 2}), None).await;
    assert_eq!(store.get("a").await, Some(json!({"n": 2})));

    store.delete("a").await;
    assert!(!store.has("a").await);

    // Deleting an absent key is a no-op.
    store.delete("a").await;
}

async fn clear_removes_everything(store: &dyn CacheStore<Value>) {
    for key in ["x", "y", "z"] {
        store.set(key, json!(key), Some(Duration::from_secs(60))).await;
    }
    store.clear().await;
    for key in ["x", "y", "z"] {
        assert!(!store.has(key).await, "{key} survived clear");
    }
}

async fn ttl_expires(store: &dyn CacheStore<Value>, wait: impl std::future::Future<Output = ()>) {
    store.set("short", json!(1), Some(Duration::from_millis(20))).await;
    store.set("long", json!(2), Some(Duration::from_secs(3600))).await;
    assert_eq!(store.get("short").await, Some(json!(1)));

    wait.await;

    assert!(!store.has("short").await);
    assert_eq!(store.get("short").await, None);
    assert_eq!(store.get("long").await, Some(json!(2)));
}

#[tokio::test(start_paused = true)]
async fn memory_store_contract() {
    let store = MemoryStore::<Value>::new();
    set_get_delete(&store).await;
    clear_removes_everything(&store).await;
    ttl_expires(&store, tokio::time::advance(Duration::from_millis(50))).await;
}

#[tokio::test]
async fn storage_store_contract() {
    let store = StorageStore::<_, Value>::new(MemoryStorage::new());
    set_get_delete(&store).await;
    clear_removes_everything(&store).await;
    ttl_expires(&store, tokio::time::sleep(Duration::from_millis(50))).await;
}

#[tokio::test]
async fn file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = StorageStore::<_, Value>::new(FileStorage::open(dir.path()).await.unwrap());
    set_get_delete(&store).await;
    clear_removes_everything(&store).await;
    ttl_expires(&store, tokio::time::sleep(Duration::from_millis(50))).await;
}

#[tokio::test]
async fn prefixes_isolate_stores_on_one_backend() {
    let backend = MemoryStorage::new();
    let users = StorageStore::<_, Value>::with_prefix(backend.clone(), "users_");
    let orders = StorageStore::<_, Value>::with_prefix(backend.clone(), "orders_");

    users.set("1", json!("ada"), None).await;
    orders.set("1", json!("order"), None).await;
    assert_eq!(users.get("1").await, Some(json!("ada")));
    assert_eq!(orders.get("1").await, Some(json!("order")));

    users.clear().await;
    assert!(!users.has("1").await);
    assert_eq!(orders.get("1").await, Some(json!("order")));
    assert_eq!(backend.len(), 1);
}
