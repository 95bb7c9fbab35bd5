//! Integration tests for the asset workflow
//!
//! These tests verify:
//! - The exact order of remote calls for a new file
//! - Dedup of repeated and concurrent invocations for one path
//! - Retry of the byte transfer and what a failed workflow leaves behind
//! - Configuration errors before any remote call

mod common;

use common::Harness;
use core_sync::{EntryKind, EntryStatus, SyncError, SyncOutcome};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_root_file_end_to_end_order() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    let sync = harness.asset_sync("B2");

    let outcome = sync.upload_if_not_exists("a.jpg", &info).await.unwrap();

    assert_eq!(
        harness.calls().await,
        vec![
            "create_asset:a.jpg:",
            "create_asset_format:asset-1",
            "create_file_set:asset-1",
            "create_file:asset-1",
            "upload:a.jpg",
            "close_file:asset-1:file-4",
            "trigger_keyframes:asset-1:file-4",
        ]
    );

    let stored = harness.store.get("a.jpg").await.unwrap().unwrap();
    assert_eq!(stored.remote_id, "file-4");
    assert_eq!(stored.asset_id, "asset-1");
    assert_eq!(stored.format_id, "format-2");
    assert_eq!(stored.file_set_id, "file_set-3");
    assert_eq!(stored.storage_id, "storage-1");
    assert_eq!(stored.kind, EntryKind::File);
    assert_eq!(stored.status, EntryStatus::Complete);
    assert_eq!(stored.size_bytes, 10);
    assert_eq!(outcome, SyncOutcome::Uploaded(stored));
}

#[tokio::test]
async fn test_catalog_payloads() {
    let harness = Harness::new().await;
    let info = harness.write_file("clips/take 1.mov", b"0123456789abcdef");
    let sync = harness.asset_sync("GCS");

    sync.upload_if_not_exists("clips/take 1.mov", &info)
        .await
        .unwrap();

    let assets = harness.catalog.assets.lock().await;
    assert_eq!(assets[0].title, "take 1.mov");
    assert_eq!(assets[0].status, "ACTIVE");
    assert_eq!(assets[0].asset_type, "ASSET");
    assert_eq!(assets[0].collection_id, "");

    let formats = harness.catalog.formats.lock().await;
    assert_eq!(formats[0].name, "ORIGINAL");
    assert_eq!(formats[0].storage_methods, vec!["GCS".to_string()]);
    assert_eq!(
        formats[0].metadata[0].get("internet_media_type").map(String::as_str),
        Some("video/quicktime")
    );

    let files = harness.catalog.files.lock().await;
    assert_eq!(files[0].original_name, "take 1.mov");
    assert_eq!(files[0].directory_path, "clips");
    assert_eq!(files[0].size, 16);
    assert_eq!(files[0].file_type, "FILE");
    assert_eq!(files[0].storage_id, "storage-1");
    assert!(files[0]
        .file_date_modified
        .as_deref()
        .is_some_and(|date| date.ends_with('Z')));

    assert!(harness
        .calls()
        .await
        .contains(&"upload:clips/take 1.mov".to_string()));
}

#[tokio::test]
async fn test_second_call_is_a_no_op() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    let sync = harness.asset_sync("S3");

    let first = sync.upload_if_not_exists("a.jpg", &info).await.unwrap();
    let calls_after_first = harness.calls().await.len();
    let second = sync.upload_if_not_exists("a.jpg", &info).await.unwrap();

    assert!(matches!(first, SyncOutcome::Uploaded(_)));
    assert_eq!(second, SyncOutcome::AlreadyTracked);
    assert_eq!(harness.calls().await.len(), calls_after_first);
    assert_eq!(harness.count_calls("create_asset:").await, 1);
}

#[tokio::test]
async fn test_concurrent_duplicates_run_once() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    harness.catalog.delay_assets(Duration::from_millis(100));
    let sync = harness.asset_sync("B2");

    let (first, second) = tokio::join!(
        sync.upload_if_not_exists("a.jpg", &info),
        sync.upload_if_not_exists("a.jpg", &info),
    );

    let mut outcomes = [first.unwrap(), second.unwrap()];
    outcomes.sort_by_key(|outcome| matches!(outcome, SyncOutcome::InFlight));

    assert!(matches!(outcomes[0], SyncOutcome::Uploaded(_)));
    assert_eq!(outcomes[1], SyncOutcome::InFlight);
    assert_eq!(harness.count_calls("create_asset:").await, 1);
    assert_eq!(harness.count_calls("upload:").await, 1);
}

#[tokio::test]
async fn test_transfer_succeeds_on_third_attempt() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    harness.backend.fail_next(2);
    let sync = harness.asset_sync("B2");

    let outcome = sync.upload_if_not_exists("a.jpg", &info).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Uploaded(_)));
    assert_eq!(harness.backend.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(harness.count_calls("close_file:").await, 1);
    assert_eq!(harness.count_calls("trigger_keyframes:").await, 1);
    assert!(harness.store.is_complete("a.jpg").await.unwrap());
}

#[tokio::test]
async fn test_transfer_exhaustion_skips_close_and_trigger() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    harness.backend.fail_next(3);
    let sync = harness.asset_sync("B2");

    let result = sync.upload_if_not_exists("a.jpg", &info).await;

    match result {
        Err(SyncError::Transfer { attempts, message }) => {
            assert_eq!(attempts, 3);
            assert!(message.contains("connection reset"));
        }
        other => panic!("expected transfer error, got {:?}", other),
    }
    assert_eq!(harness.backend.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(harness.count_calls("close_file:").await, 0);
    assert_eq!(harness.count_calls("trigger_keyframes:").await, 0);
}

#[tokio::test]
async fn test_failed_workflow_leaves_no_record() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    harness.catalog.fail_on("create_file");
    let sync = harness.asset_sync("B2");

    let result = sync.upload_if_not_exists("a.jpg", &info).await;

    assert!(matches!(result, Err(SyncError::Catalog(_))));
    assert!(!harness.store.exists("a.jpg").await.unwrap());
    assert_eq!(harness.count_calls("upload:").await, 0);
}

#[tokio::test]
async fn test_failed_path_is_retried_later() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    harness.backend.fail_next(3);
    let sync = harness.asset_sync("B2");

    assert!(sync.upload_if_not_exists("a.jpg", &info).await.is_err());
    let outcome = sync.upload_if_not_exists("a.jpg", &info).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Uploaded(_)));
    assert_eq!(harness.count_calls("create_asset:").await, 2);
}

#[tokio::test]
async fn test_unknown_storage_method_makes_no_remote_calls() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    let sync = harness.asset_sync("FTP");

    let result = sync.upload_asset("a.jpg", &info).await;

    assert!(matches!(result, Err(SyncError::Configuration(_))));
    assert!(harness.calls().await.is_empty());
    assert!(!harness.store.exists("a.jpg").await.unwrap());
}

#[tokio::test]
async fn test_upload_asset_does_not_persist_completion() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    let sync = harness.asset_sync("B2");

    let entry = sync.upload_asset("a.jpg", &info).await.unwrap();

    assert!(entry.is_complete());
    let stored = harness.store.get("a.jpg").await.unwrap().unwrap();
    assert_eq!(stored.status, EntryStatus::Pending);
}

#[tokio::test]
async fn test_upload_asset_keeps_existing_complete_entry() {
    let harness = Harness::new().await;
    let info = harness.write_file("a.jpg", b"jpeg bytes");
    let sync = harness.asset_sync("B2");

    sync.upload_if_not_exists("a.jpg", &info).await.unwrap();
    let original = harness.store.get("a.jpg").await.unwrap().unwrap();
    assert!(original.is_complete());

    harness.backend.fail_next(3);
    assert!(sync.upload_asset("a.jpg", &info).await.is_err());

    let after_failure = harness.store.get("a.jpg").await.unwrap().unwrap();
    assert_eq!(after_failure.status, EntryStatus::Complete);
    assert_eq!(after_failure.remote_id, original.remote_id);

    let entry = sync.upload_asset("a.jpg", &info).await.unwrap();
    assert_ne!(entry.remote_id, original.remote_id);

    let after_success = harness.store.get("a.jpg").await.unwrap().unwrap();
    assert_eq!(after_success.status, EntryStatus::Complete);
    assert_eq!(after_success.remote_id, original.remote_id);
}

#[tokio::test]
async fn test_file_joins_parent_collection() {
    let harness = Harness::new().await;
    let dir_info = harness.make_dir("photos");
    let info = harness.write_file("photos/a.jpg", b"jpeg bytes");

    let collection = harness
        .collection_sync()
        .sync_directory("photos", &dir_info)
        .await
        .unwrap()
        .unwrap();
    harness
        .asset_sync("B2")
        .upload_if_not_exists("photos/a.jpg", &info)
        .await
        .unwrap();

    let assets = harness.catalog.assets.lock().await;
    assert_eq!(assets[0].collection_id, collection.remote_id);
    drop(assets);

    let calls = harness.calls().await;
    assert!(calls.contains(&format!("create_asset:a.jpg:{}", collection.remote_id)));
    assert!(calls.contains(&"upload:photos/a.jpg".to_string()));
}
