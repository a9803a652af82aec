//! Behaviour shared by every [`CacheStore`] implementation.

use super::*;
use tempfile::TempDir;

fn entry(key: &str, cached_at: i64) -> CacheEntry {
    CacheEntry::new(key, format!("content for {}", key), "m", 42, cached_at)
}

async fn exercise_round_trip(store: &dyn CacheStore) {
    assert!(store.get("k1").await.unwrap().is_none());

    let original = entry("k1", 1_000);
    store.put("k1", &original).await.unwrap();
    assert_eq!(store.get("k1").await.unwrap(), Some(original.clone()));

    let touched = original.touched(2_000);
    store.put("k1", &touched).await.unwrap();
    let loaded = store.get("k1").await.unwrap().unwrap();
    assert_eq!(loaded.hit_count, 1);
    assert_eq!(loaded.content, original.content);
}

async fn exercise_delete(store: &dyn CacheStore) {
    store.put("k1", &entry("k1", 1_000)).await.unwrap();

    assert!(store.delete("k1").await.unwrap());
    assert!(!store.delete("k1").await.unwrap());
    assert!(store.get("k1").await.unwrap().is_none());
}

async fn exercise_list_and_delete_where(store: &dyn CacheStore) {
    for (key, ts) in [("old1", 100), ("old2", 200), ("new1", 5_000), ("new2", 6_000)] {
        store.put(key, &entry(key, ts)).await.unwrap();
    }

    let mut keys = store.list_keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["new1", "new2", "old1", "old2"]);

    let removed = store
        .delete_where(&|e: &CacheEntry| e.is_older_than(1_000))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let mut keys = store.list_keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["new1", "new2"]);

    let removed_again = store
        .delete_where(&|e: &CacheEntry| e.is_older_than(1_000))
        .await
        .unwrap();
    assert_eq!(removed_again, 0);
}

#[tokio::test]
async fn test_memory_store_round_trip() {
    exercise_round_trip(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_memory_store_delete() {
    exercise_delete(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_memory_store_delete_where() {
    exercise_list_and_delete_where(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_memory_store_clones_share_state() {
    let a = MemoryStore::new();
    let b = a.clone();
    a.put("k", &entry("k", 1)).await.unwrap();
    assert_eq!(b.len(), 1);
    assert!(!b.is_empty());
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let temp = TempDir::new().unwrap();
    exercise_round_trip(&FileStore::new(temp.path())).await;
}

#[tokio::test]
async fn test_file_store_delete() {
    let temp = TempDir::new().unwrap();
    exercise_delete(&FileStore::new(temp.path())).await;
}

#[tokio::test]
async fn test_file_store_delete_where() {
    let temp = TempDir::new().unwrap();
    exercise_list_and_delete_where(&FileStore::new(temp.path())).await;
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let original = entry("persisted", 1_234);
    FileStore::new(temp.path())
        .put("persisted", &original)
        .await
        .unwrap();

    let reopened = FileStore::new(temp.path());
    assert_eq!(reopened.get("persisted").await.unwrap(), Some(original));
}

#[tokio::test]
async fn test_file_store_delete_where_skips_corrupt_entry() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    store.put("zzold", &entry("zzold", 100)).await.unwrap();
    store.put("zznew", &entry("zznew", 5_000)).await.unwrap();
    std::fs::write(temp.path().join("aaa.rkyv"), b"not an archive").unwrap();

    let removed = store
        .delete_where(&|e: &CacheEntry| e.is_older_than(1_000))
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.list_keys().await.unwrap(), vec!["zznew".to_string()]);
}
