//! Integration tests for ObjectStore implementations used through trait objects.

mod common;

use common::fixtures;
use presence_core::config::StorageConfig;
use presence_storage::{ObjectStore, StorageError};
use std::sync::Arc;
use tempfile::TempDir;

async fn filesystem_store() -> (Arc<dyn ObjectStore>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = StorageConfig::Filesystem {
        path: temp_dir.path().join("icons"),
    };
    let store = presence_storage::from_config(&config)
        .await
        .expect("Failed to create storage");
    (store, temp_dir)
}

#[tokio::test]
async fn test_put_get_roundtrip() {
    let (store, _dir) = filesystem_store().await;

    let data = fixtures::seeded_bytes(42, 1024);
    let key = fixtures::icon_key(&data);

    store.put(&key, data.clone(), "image/png").await.expect("Put failed");
    assert!(store.exists(&key).await.expect("Exists check failed"));
    assert_eq!(store.get(&key).await.expect("Get failed"), data);
}

#[tokio::test]
async fn test_exists_false_after_out_of_band_delete() {
    let (store, _dir) = filesystem_store().await;

    let data = fixtures::seeded_bytes(7, 64);
    let key = fixtures::icon_key(&data);

    store.put(&key, data, "image/png").await.unwrap();
    store.delete(&key).await.unwrap();

    assert!(!store.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_get_not_found() {
    let (store, _dir) = filesystem_store().await;

    match store.get("nonexistent.png").await {
        Err(StorageError::NotFound(key)) => assert_eq!(key, "nonexistent.png"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_puts_same_key() {
    let (store, _dir) = filesystem_store().await;

    let data = fixtures::seeded_bytes(3, 4096);
    let key = fixtures::icon_key(&data);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let key = key.clone();
        let data = data.clone();
        handles.push(tokio::spawn(async move {
            store.put(&key, data, "image/png").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.get(&key).await.unwrap(), data);
}

#[tokio::test]
async fn test_health_check() {
    let (store, _dir) = filesystem_store().await;
    store.health_check().await.unwrap();
}
