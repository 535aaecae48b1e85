use crate::storage::{BlacklistStore, SqliteStorage, Storage, StorageError, VisitStore};
use std::sync::Arc;

async fn setup_sqlite() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

#[tokio::test]
async fn test_record_assigns_increasing_ids() {
    let storage = setup_sqlite().await;

    let first = storage.record("10.0.0.1", None).await.unwrap();
    let second = storage.record("10.0.0.2", Some("Paris, Ile-de-France")).await.unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.ip_address, "10.0.0.1");
    assert_eq!(first.location, None);
    assert_eq!(second.location.as_deref(), Some("Paris, Ile-de-France"));
}

#[tokio::test]
async fn test_record_timestamp_within_call_window() {
    let storage = setup_sqlite().await;

    let before = chrono::Utc::now().timestamp();
    let visit = storage.record("10.0.0.1", None).await.unwrap();
    let after = chrono::Utc::now().timestamp();

    assert!(visit.timestamp >= before && visit.timestamp <= after);
}

#[tokio::test]
async fn test_record_rejects_empty_ip() {
    let storage = setup_sqlite().await;

    let result = storage.record("", None).await;
    assert!(matches!(result, Err(StorageError::InvalidInput)));
    assert_eq!(storage.count_visits().await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_visits_insertion_order() {
    let storage = setup_sqlite().await;

    for ip in ["10.0.0.3", "10.0.0.1", "10.0.0.2"] {
        storage.record(ip, None).await.unwrap();
    }

    let ips: Vec<String> = storage
        .list_visits()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.ip_address)
        .collect();
    assert_eq!(ips, vec!["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
}

#[tokio::test]
async fn test_list_visits_by_ip_exact_match() {
    let storage = setup_sqlite().await;

    storage.record("10.0.0.1", None).await.unwrap();
    storage.record("10.0.0.10", None).await.unwrap();
    storage.record("10.0.0.1", Some("Unknown")).await.unwrap();

    let visits = storage.list_visits_by_ip("10.0.0.1").await.unwrap();
    assert_eq!(visits.len(), 2);
    assert!(visits.iter().all(|v| v.ip_address == "10.0.0.1"));
    assert!(visits[0].id < visits[1].id);

    assert!(storage.list_visits_by_ip("192.0.2.1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_counts_and_grouping_agree_with_listing() {
    let storage = setup_sqlite().await;

    for ip in ["a", "b", "a", "c", "a", "b"] {
        storage.record(ip, None).await.unwrap();
    }

    let visits = storage.list_visits().await.unwrap();
    let total = storage.count_visits().await.unwrap();
    let distinct = storage.count_distinct_ips().await.unwrap();
    let groups = storage.group_counts_by_ip().await.unwrap();

    assert_eq!(total, visits.len() as i64);
    assert_eq!(distinct, 3);
    assert_eq!(groups.get("a"), Some(&3));
    assert_eq!(groups.get("b"), Some(&2));
    assert_eq!(groups.get("c"), Some(&1));
    assert_eq!(groups.values().sum::<i64>(), total);
}

#[tokio::test]
async fn test_empty_store_counts() {
    let storage = setup_sqlite().await;

    assert_eq!(storage.count_visits().await.unwrap(), 0);
    assert_eq!(storage.count_distinct_ips().await.unwrap(), 0);
    assert!(storage.group_counts_by_ip().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blacklist_duplicate_rejected_without_mutation() {
    let storage = setup_sqlite().await;

    let entry = storage.add_to_blacklist("198.51.100.7").await.unwrap();
    assert_eq!(entry.ip_address, "198.51.100.7");

    let second = storage.add_to_blacklist("198.51.100.7").await;
    assert!(matches!(second, Err(StorageError::Duplicate(ref ip)) if ip == "198.51.100.7"));

    let list = storage.list_blacklist().await.unwrap();
    assert_eq!(list, vec!["198.51.100.7".to_string()]);
}

#[tokio::test]
async fn test_blacklist_rejects_empty_ip() {
    let storage = setup_sqlite().await;

    let result = storage.add_to_blacklist("").await;
    assert!(matches!(result, Err(StorageError::InvalidInput)));
    assert!(storage.list_blacklist().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blacklist_does_not_affect_visits() {
    let storage = setup_sqlite().await;

    storage.add_to_blacklist("198.51.100.7").await.unwrap();
    storage.record("198.51.100.7", None).await.unwrap();

    assert!(storage.is_blacklisted("198.51.100.7").await.unwrap());
    assert!(!storage.is_blacklisted("198.51.100.8").await.unwrap());
    assert_eq!(storage.count_visits().await.unwrap(), 1);
}
