use super::*;

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mediconnect-{tag}-{}.json", uuid::Uuid::new_v4()))
}

// =============================================================================
// MemoryStore
// =============================================================================

#[tokio::test]
async fn memory_get_missing_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get("absent").await.unwrap(), None);
}

#[tokio::test]
async fn memory_set_get_delete() {
    let store = MemoryStore::new();
    store.set("k", "v1").await.unwrap();
    store.set("k", "v2").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

    store.delete("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn memory_delete_missing_is_ok() {
    let store = MemoryStore::new();
    assert!(store.delete("never-set").await.is_ok());
}

// =============================================================================
// FileStore
// =============================================================================

#[tokio::test]
async fn file_missing_reads_empty() {
    let store = FileStore::new(temp_path("missing"));
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.delete("k").await.is_ok());
}

#[tokio::test]
async fn file_survives_reopen() {
    let path = temp_path("reopen");
    {
        let store = FileStore::new(&path);
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
    }

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
    assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));

    reopened.delete("a").await.unwrap();
    let again = FileStore::new(&path);
    assert_eq!(again.get("a").await.unwrap(), None);
    assert_eq!(again.get("b").await.unwrap().as_deref(), Some("2"));

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn file_values_are_stored_verbatim() {
    let path = temp_path("verbatim");
    let store = FileStore::new(&path);
    let value = r#"{"nested":"json","quote":"\""}"#;
    store.set("k", value).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some(value));
    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn file_with_garbage_reads_empty_and_is_replaced() {
    let path = temp_path("garbage");
    tokio::fs::write(&path, "{corrupt").await.unwrap();
    let store = FileStore::new(&path);
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.delete("k").await.is_ok());

    store.set("k", "v").await.unwrap();
    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(serde_json::from_str::<HashMap<String, String>>(&raw).is_ok());
    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn file_blank_reads_empty() {
    let path = temp_path("blank");
    tokio::fs::write(&path, "\n").await.unwrap();
    let store = FileStore::new(&path);
    assert_eq!(store.get("k").await.unwrap(), None);
    let _ = tokio::fs::remove_file(&path).await;
}

// =============================================================================
// Namespaced
// =============================================================================

#[tokio::test]
async fn namespaced_views_are_isolated() {
    let shared: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let alice = Namespaced::new(shared.clone(), "alice");
    let bob = Namespaced::new(shared.clone(), "bob");

    alice.set("mediconnect_user", "a").await.unwrap();
    assert_eq!(bob.get("mediconnect_user").await.unwrap(), None);
    assert_eq!(alice.get("mediconnect_user").await.unwrap().as_deref(), Some("a"));

    bob.set("mediconnect_user", "b").await.unwrap();
    alice.delete("mediconnect_user").await.unwrap();
    assert_eq!(bob.get("mediconnect_user").await.unwrap().as_deref(), Some("b"));
}

#[tokio::test]
async fn namespaced_prefixes_keys_in_backend() {
    let shared: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let view = Namespaced::new(shared.clone(), "client-1");
    view.set("k", "v").await.unwrap();
    assert_eq!(shared.get("client-1:k").await.unwrap().as_deref(), Some("v"));
    assert_eq!(shared.get("k").await.unwrap(), None);
}

// =============================================================================
// PgStore: requires DATABASE_URL and the live-db-tests feature.
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn pg_set_get_delete() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url, 2).await.unwrap();
    let store = PgStore::new(pool);
    let key = format!("test:{}", uuid::Uuid::new_v4());

    assert_eq!(store.get(&key).await.unwrap(), None);
    store.set(&key, "v1").await.unwrap();
    store.set(&key, "v2").await.unwrap();
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("v2"));
    store.delete(&key).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap(), None);
}
