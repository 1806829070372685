//! Tests for DocumentStore
//!
//! These tests verify:
//! - Basic get/set/append/delete/list operations
//! - Missing vs. explicitly stored empty values
//! - Corrupt artifacts read as missing and are counted
//! - Failed writes leave the cache untouched
//! - Cold-cache reads from a fresh instance

use std::collections::BTreeSet;
use std::fs;

use memoria::config::{Config, Durability};
use memoria::store::DocumentStore;
use memoria::{Document, MemoriaError};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn temp_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .durability(Durability::Fsync)
        .build()
}

async fn setup_temp_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(&temp_config(&temp_dir), "wonder")
        .await
        .unwrap();
    (temp_dir, store)
}

fn keys(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Initialize Tests
// =============================================================================

#[tokio::test]
async fn test_initialize_creates_namespace_root() {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::new(&temp_config(&temp_dir), "identity").unwrap();

    assert!(!temp_dir.path().join("identity").exists());

    store.initialize().await.unwrap();
    store.initialize().await.unwrap(); // idempotent

    assert!(temp_dir.path().join("identity").is_dir());
    assert_eq!(store.root(), temp_dir.path().join("identity"));
    assert_eq!(store.namespace(), "identity");
}

#[tokio::test]
async fn test_initialize_fails_when_root_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("growth"), b"in the way").unwrap();

    let store = DocumentStore::new(&temp_config(&temp_dir), "growth").unwrap();
    let err = store.initialize().await.unwrap_err();

    assert!(err.is_storage(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_first_write_creates_root_lazily() {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::new(&temp_config(&temp_dir), "values").unwrap();

    store.set("values", json!([])).await.unwrap();

    assert!(temp_dir.path().join("values").join("values.json").is_file());
}

#[test]
fn test_new_rejects_invalid_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let result = DocumentStore::new(&temp_config(&temp_dir), "../escape");
    assert!(matches!(result, Err(MemoriaError::InvalidNamespace { .. })));
}

// =============================================================================
// Get/Set Tests
// =============================================================================

#[tokio::test]
async fn test_set_get() {
    let (_temp, store) = setup_temp_store().await;

    let doc = json!({"question": "why?", "explorations": [], "status": "open"});
    store.set("core", doc.clone()).await.unwrap();

    assert_eq!(store.get("core").await.unwrap(), Some(doc));
}

#[tokio::test]
async fn test_get_nonexistent_key() {
    let (_temp, store) = setup_temp_store().await;

    assert_eq!(store.get("nothing").await.unwrap(), None);
    assert!(!store.contains("nothing").await.unwrap());
}

#[tokio::test]
async fn test_set_overwrite() {
    let (_temp, store) = setup_temp_store().await;

    store.set("key", json!(1)).await.unwrap();
    store.set("key", json!("two")).await.unwrap();

    assert_eq!(store.get("key").await.unwrap(), Some(json!("two")));
}

#[tokio::test]
async fn test_empty_values_are_distinct_from_missing() {
    let (_temp, store) = setup_temp_store().await;

    store.set("empty-list", json!([])).await.unwrap();
    store.set("empty-map", json!({})).await.unwrap();
    store.set("null", Document::Null).await.unwrap();

    assert_eq!(store.get("empty-list").await.unwrap(), Some(json!([])));
    assert_eq!(store.get("empty-map").await.unwrap(), Some(json!({})));
    assert_eq!(store.get("null").await.unwrap(), Some(Document::Null));
    assert_eq!(store.get("never-set").await.unwrap(), None);
}

#[tokio::test]
async fn test_artifact_is_pretty_printed_json() {
    let (temp, store) = setup_temp_store().await;

    store.set("journal", json!([{"id": "a"}])).await.unwrap();

    let text = fs::read_to_string(temp.path().join("wonder").join("journal.json")).unwrap();
    assert_eq!(text, "[\n  {\n    \"id\": \"a\"\n  }\n]");
}

#[tokio::test]
async fn test_set_populates_cache() {
    let (_temp, store) = setup_temp_store().await;

    store.set("k", json!(1)).await.unwrap();
    assert!(store.is_cached("k"));

    store.get("k").await.unwrap();
    let stats = store.stats();
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.writes, 1);
}

#[tokio::test]
async fn test_invalid_keys_are_rejected() {
    let (_temp, store) = setup_temp_store().await;

    for key in ["", "../core", "a/b", ".hidden"] {
        let err = store.set(key, json!(1)).await.unwrap_err();
        assert!(matches!(err, MemoriaError::InvalidKey { .. }), "key {key:?}");
        assert!(store.get(key).await.is_err());
    }
}

// =============================================================================
// Append Tests
// =============================================================================

#[tokio::test]
async fn test_append_sequential_preserves_order() {
    let (_temp, store) = setup_temp_store().await;

    store.set("journal", json!([])).await.unwrap();
    for id in ["a", "b", "c"] {
        store.append("journal", json!({"id": id})).await.unwrap();
    }

    let journal = store.get("journal").await.unwrap().unwrap();
    assert_eq!(journal, json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]));
}

#[tokio::test]
async fn test_append_to_missing_key_starts_sequence() {
    let (_temp, store) = setup_temp_store().await;

    let result = store.append("narrative", json!("first")).await.unwrap();

    assert_eq!(result, json!(["first"]));
    assert_eq!(store.get("narrative").await.unwrap(), Some(json!(["first"])));
}

#[tokio::test]
async fn test_append_returns_new_sequence() {
    let (_temp, store) = setup_temp_store().await;

    store.append("k", json!(1)).await.unwrap();
    let result = store.append("k", json!(2)).await.unwrap();

    assert_eq!(result, json!([1, 2]));
}

#[tokio::test]
async fn test_append_to_non_sequence_fails_without_writing() {
    let (_temp, store) = setup_temp_store().await;

    store.set("core", json!({"name": "x"})).await.unwrap();
    let err = store.append("core", json!(1)).await.unwrap_err();

    assert!(matches!(err, MemoriaError::NotASequence { ref key } if key == "core"));
    assert_eq!(store.get("core").await.unwrap(), Some(json!({"name": "x"})));
    assert_eq!(store.stats().writes, 1);
}

// =============================================================================
// Update / Get-Or-Insert Tests
// =============================================================================

#[tokio::test]
async fn test_update_transforms_current_value() {
    let (_temp, store) = setup_temp_store().await;

    store
        .set("wonders", json!([{"id": "w1", "status": "open"}]))
        .await
        .unwrap();

    let updated = store
        .update("wonders", |current| {
            let mut wonders = current.unwrap_or_else(|| json!([]));
            wonders[0]["status"] = json!("exploring");
            Ok(wonders)
        })
        .await
        .unwrap();

    assert_eq!(updated, json!([{"id": "w1", "status": "exploring"}]));
    assert_eq!(store.get("wonders").await.unwrap(), Some(updated));
}

#[tokio::test]
async fn test_update_sees_missing_as_none() {
    let (_temp, store) = setup_temp_store().await;

    let result = store
        .update("fresh", |current| {
            assert!(current.is_none());
            Ok(json!({"created": true}))
        })
        .await
        .unwrap();

    assert_eq!(result, json!({"created": true}));
}

#[tokio::test]
async fn test_update_error_writes_nothing() {
    let (temp, store) = setup_temp_store().await;

    store.set("people", json!(["ada"])).await.unwrap();
    let err = store
        .update("people", |_| Err(MemoriaError::Update("person not found".into())))
        .await
        .unwrap_err();

    assert!(matches!(err, MemoriaError::Update(_)));
    assert_eq!(store.get("people").await.unwrap(), Some(json!(["ada"])));

    let on_disk = fs::read_to_string(temp.path().join("wonder").join("people.json")).unwrap();
    assert_eq!(serde_json::from_str::<Document>(&on_disk).unwrap(), json!(["ada"]));
}

#[tokio::test]
async fn test_get_or_insert_seeds_once() {
    let (_temp, store) = setup_temp_store().await;

    let seeded = store
        .get_or_insert("core", json!({"awakenings": []}))
        .await
        .unwrap();
    assert_eq!(seeded, json!({"awakenings": []}));

    let existing = store
        .get_or_insert("core", json!({"awakenings": ["other"]}))
        .await
        .unwrap();
    assert_eq!(existing, json!({"awakenings": []}));
    assert_eq!(store.stats().writes, 1);
}

// =============================================================================
// Delete / List Tests
// =============================================================================

#[tokio::test]
async fn test_delete_removes_artifact_and_cache() {
    let (temp, store) = setup_temp_store().await;

    store.set("x", json!({"a": 1})).await.unwrap();
    assert!(store.delete("x").await.unwrap());

    assert_eq!(store.get("x").await.unwrap(), None);
    assert!(!store.list().await.unwrap().contains("x"));
    assert!(!store.is_cached("x"));
    assert!(!temp.path().join("wonder").join("x.json").exists());
    assert_eq!(store.stats().deletes, 1);
}

#[tokio::test]
async fn test_delete_nonexistent_key() {
    let (_temp, store) = setup_temp_store().await;

    // Should not error
    assert!(!store.delete("never").await.unwrap());
    assert_eq!(store.stats().deletes, 0);
}

#[tokio::test]
async fn test_list_tracks_set_and_delete() {
    let (_temp, store) = setup_temp_store().await;

    assert!(store.list().await.unwrap().is_empty());

    store.set("a", json!(1)).await.unwrap();
    store.set("b", json!(2)).await.unwrap();
    store.append("c", json!(3)).await.unwrap();
    store.delete("b").await.unwrap();

    assert_eq!(store.list().await.unwrap(), keys(&["a", "c"]));
}

#[tokio::test]
async fn test_list_ignores_foreign_files() {
    let (temp, store) = setup_temp_store().await;
    let root = temp.path().join("wonder");

    store.set("real", json!(1)).await.unwrap();
    fs::write(root.join(".abc123.tmp"), b"partial").unwrap();
    fs::write(root.join("notes.txt"), b"hello").unwrap();
    fs::create_dir(root.join("subdir.json")).unwrap();

    assert_eq!(store.list().await.unwrap(), keys(&["real"]));
}

#[tokio::test]
async fn test_list_is_independent_of_cache() {
    let (temp, store) = setup_temp_store().await;

    fs::write(temp.path().join("wonder").join("external.json"), b"[]").unwrap();

    assert_eq!(store.list().await.unwrap(), keys(&["external"]));
    assert_eq!(store.cached_len(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_and_get_follow_symlinked_artifacts() {
    let (temp, store) = setup_temp_store().await;
    let shared = temp.path().join("shared.json");
    fs::write(&shared, b"[\"from elsewhere\"]").unwrap();
    std::os::unix::fs::symlink(&shared, temp.path().join("wonder").join("linked.json")).unwrap();

    assert_eq!(store.list().await.unwrap(), keys(&["linked"]));
    assert_eq!(
        store.get("linked").await.unwrap(),
        Some(json!(["from elsewhere"]))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_verify_continues_past_unreadable_artifact() {
    let (temp, store) = setup_temp_store().await;
    store.set("fine", json!({"ok": true})).await.unwrap();
    std::os::unix::fs::symlink("loop.json", temp.path().join("wonder").join("loop.json")).unwrap();

    let report = store.verify().await.unwrap();

    assert_eq!(report.healthy, vec!["fine".to_string()]);
    assert_eq!(report.unreadable.len(), 1);
    assert_eq!(report.unreadable[0].key, "loop");
    assert!(!report.is_clean());
}

#[tokio::test]
async fn test_list_uninitialized_namespace_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::new(&temp_config(&temp_dir), "thoughts").unwrap();

    assert!(store.list().await.unwrap().is_empty());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[tokio::test]
async fn test_corrupt_artifact_reads_as_missing() {
    let (temp, store) = setup_temp_store().await;
    let root = temp.path().join("wonder");

    store.set("healthy", json!({"ok": true})).await.unwrap();
    fs::write(root.join("broken.json"), b"{\"unterminated\": [").unwrap();

    assert_eq!(store.get("broken").await.unwrap(), None);
    assert_eq!(store.stats().corrupt_artifacts, 1);

    // Other keys are unaffected
    assert_eq!(store.get("healthy").await.unwrap(), Some(json!({"ok": true})));

    // The artifact is still listed; it has not been deleted
    assert!(store.list().await.unwrap().contains("broken"));
}

#[tokio::test]
async fn test_corrupt_artifact_is_not_cached() {
    let (temp, store) = setup_temp_store().await;
    let path = temp.path().join("wonder").join("broken.json");

    fs::write(&path, [0xff, 0xfe, 0x00, 0x01]).unwrap();
    assert_eq!(store.get("broken").await.unwrap(), None);
    assert!(!store.is_cached("broken"));

    // Repaired out of band: the next read sees it
    fs::write(&path, b"[1]").unwrap();
    assert_eq!(store.get("broken").await.unwrap(), Some(json!([1])));
    assert_eq!(store.stats().corrupt_artifacts, 1);
}

#[tokio::test]
async fn test_append_over_corrupt_artifact_starts_fresh() {
    let (temp, store) = setup_temp_store().await;

    fs::write(temp.path().join("wonder").join("log.json"), b"garbage").unwrap();
    let result = store.append("log", json!("entry")).await.unwrap();

    assert_eq!(result, json!(["entry"]));
    assert_eq!(store.stats().corrupt_artifacts, 1);
}

#[tokio::test]
async fn test_unreadable_artifact_propagates_storage_error() {
    let (temp, store) = setup_temp_store().await;

    // A directory where the artifact should be cannot be read as a file
    fs::create_dir(temp.path().join("wonder").join("weird.json")).unwrap();

    let err = store.get("weird").await.unwrap_err();
    assert!(err.is_storage(), "unexpected error: {err}");
    assert_eq!(store.stats().corrupt_artifacts, 0);
}

#[tokio::test]
async fn test_verify_reports_corrupt_artifacts() {
    let (temp, store) = setup_temp_store().await;

    store.set("a", json!(1)).await.unwrap();
    store.set("b", json!(2)).await.unwrap();
    fs::write(temp.path().join("wonder").join("c.json"), b"nope").unwrap();

    let report = store.verify().await.unwrap();

    assert_eq!(report.healthy, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.corrupt.len(), 1);
    assert_eq!(report.corrupt[0].key, "c");
    assert!(!report.is_clean());
    assert_eq!(report.total(), 3);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[tokio::test]
async fn test_failed_write_leaves_cache_unchanged() {
    let (temp, store) = setup_temp_store().await;
    let path = temp.path().join("wonder").join("k.json");

    store.set("k", json!("committed")).await.unwrap();

    // Replace the artifact with a non-empty directory so the rename fails
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();
    fs::write(path.join("blocker"), b"x").unwrap();

    let err = store.set("k", json!("never committed")).await.unwrap_err();
    assert!(err.is_storage(), "unexpected error: {err}");

    assert_eq!(store.get("k").await.unwrap(), Some(json!("committed")));
    assert_eq!(store.stats().writes, 1);
}

#[tokio::test]
async fn test_failed_write_leaves_no_temp_files() {
    let (temp, store) = setup_temp_store().await;
    let root = temp.path().join("wonder");

    fs::create_dir(root.join("k.json")).unwrap();
    fs::write(root.join("k.json").join("blocker"), b"x").unwrap();

    assert!(store.set("k", json!([1])).await.is_err());

    let leftovers: Vec<_> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| name.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[tokio::test]
async fn test_cold_cache_reads_last_durable_value() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_config(&temp_dir);

    {
        let a = DocumentStore::open(&config, "identity").await.unwrap();
        a.set("y", json!(1)).await.unwrap();
        a.set("core", json!({"name": "first"})).await.unwrap();
        a.set("core", json!({"name": "second"})).await.unwrap();
    }

    let b = DocumentStore::open(&config, "identity").await.unwrap();
    assert_eq!(b.cached_len(), 0);

    assert_eq!(b.get("y").await.unwrap(), Some(json!(1)));
    assert_eq!(b.get("core").await.unwrap(), Some(json!({"name": "second"})));
    assert_eq!(b.stats().cache_hits, 0);
    assert_eq!(b.cached_len(), 2);
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_config(&temp_dir);

    let thoughts = DocumentStore::open(&config, "thoughts").await.unwrap();
    let growth = DocumentStore::open(&config, "growth").await.unwrap();

    thoughts.set("garden", json!(["seed"])).await.unwrap();

    assert_eq!(growth.get("garden").await.unwrap(), None);
    assert!(growth.list().await.unwrap().is_empty());
}
