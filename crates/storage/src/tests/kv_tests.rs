use super::create_test_store;
use crate::{KeyValueStore, SqliteStore};

#[test]
fn test_set_get_overwrite() {
    let (store, _temp_dir) = create_test_store();

    assert_eq!(store.get("regdesk_visits").unwrap(), None);
    store.set("regdesk_visits", "1").unwrap();
    store.set("regdesk_visits", "2").unwrap();

    assert_eq!(store.get("regdesk_visits").unwrap().as_deref(), Some("2"));
    assert_eq!(store.keys().unwrap(), vec!["regdesk_visits".to_owned()]);
}

#[test]
fn test_remove_missing_key_is_ok() {
    let (store, _temp_dir) = create_test_store();
    store.remove("nothing-here").unwrap();

    store.set("a", "1").unwrap();
    store.remove("a").unwrap();
    assert!(store.get("a").unwrap().is_none());
}

#[test]
fn test_keys_with_prefix_sorted() {
    let (store, _temp_dir) = create_test_store();
    store.set("edit_b", "x").unwrap();
    store.set("regdesk_draft", "{}").unwrap();
    store.set("edit_a", "y").unwrap();
    store.set("editor", "z").unwrap();

    assert_eq!(store.keys_with_prefix("edit_").unwrap(), vec!["edit_a", "edit_b"]);
    assert_eq!(store.keys().unwrap().len(), 4);
}

#[test]
fn test_prefix_is_literal() {
    let (store, _temp_dir) = create_test_store();
    store.set("edit_%", "x").unwrap();
    store.set("editX", "y").unwrap();

    // given: a prefix containing LIKE wildcards
    let keys = store.keys_with_prefix("edit_%").unwrap();

    // then: matched literally, not as a pattern
    assert_eq!(keys, vec!["edit_%"]);
}

#[test]
fn test_survives_reopen() {
    let (store, temp_dir) = create_test_store();
    store.set("regdesk_candidates", "[]").unwrap();
    drop(store);

    let reopened = SqliteStore::open(&temp_dir.path().join("test.db"), 1).unwrap();
    assert_eq!(reopened.get("regdesk_candidates").unwrap().as_deref(), Some("[]"));
}
