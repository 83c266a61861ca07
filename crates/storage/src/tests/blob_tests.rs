use super::{create_test_photo, create_test_store};
use crate::BlobStore;
use regdesk_core::PhotoRecord;

#[tokio::test]
async fn test_put_get_roundtrip() {
    let (store, _temp_dir) = create_test_store();
    let photo = create_test_photo("c-1");

    store.put(&photo).await.unwrap();

    assert_eq!(store.get("c-1").await.unwrap(), Some(photo));
    assert_eq!(store.get("c-2").await.unwrap(), None);
}

#[tokio::test]
async fn test_put_overwrites_same_id() {
    let (store, _temp_dir) = create_test_store();
    store.put(&create_test_photo("c-1")).await.unwrap();

    let replacement = PhotoRecord::new("c-1".to_owned(), "data:image/jpeg;base64,new".to_owned());
    store.put(&replacement).await.unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all, vec![replacement]);
}

#[tokio::test]
async fn test_get_all_and_delete() {
    let (store, _temp_dir) = create_test_store();
    store.put(&create_test_photo("b")).await.unwrap();
    store.put(&create_test_photo("a")).await.unwrap();

    let ids: Vec<String> = store.get_all().await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    assert!(store.delete("a").await.unwrap());
    assert!(!store.delete("a").await.unwrap());
    assert_eq!(store.get_all().await.unwrap().len(), 1);
}
