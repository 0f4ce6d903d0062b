//! StudentStore interface tests.
//!
//! These tests verify the versioned-write contract of the StudentStore trait.
//! Each storage implementation should run these tests.

use serde_json::json;
use uuid::Uuid;

use stride::models::{Student, StudentStatus};
use stride::storage::{StorageError, StudentStore};

fn unique_id() -> String {
    format!("test_{}", Uuid::new_v4())
}

/// A student with a given balance, as the CRUD layer would hand it over.
pub fn make_student(id: &str, remaining: u32, total: u32) -> Student {
    serde_json::from_value(json!({
        "id": id,
        "name": "Li Wei",
        "course_name": "Basketball",
        "status": "active",
        "remaining_times": remaining,
        "total_times": total,
    }))
    .expect("student json should deserialize")
}

// =============================================================================
// StudentStore::get tests
// =============================================================================

pub async fn test_get_nonexistent<S: StudentStore>(store: &S) {
    let err = store.get(&unique_id()).await.expect_err("get should fail");
    assert!(
        matches!(err, StorageError::NotFound { entity: "student", .. }),
        "expected NotFound, got {err:?}"
    );
}

pub async fn test_insert_and_get<S: StudentStore>(store: &S) {
    let id = unique_id();
    let stored = store
        .put(&make_student(&id, 7, 12), None)
        .await
        .expect("insert should succeed");
    assert_eq!(stored.version, 1);

    let fetched = store.get(&id).await.expect("get should succeed");
    assert_eq!(fetched.version, 1);
    assert_eq!(fetched.remaining_times(), 7);
    assert_eq!(fetched.total_times(), 12);
    assert_eq!(fetched.name, "Li Wei");
    assert_eq!(fetched.status, StudentStatus::Active);
}

// =============================================================================
// StudentStore::put tests
// =============================================================================

pub async fn test_insert_existing_rejected<S: StudentStore>(store: &S) {
    let id = unique_id();
    store
        .put(&make_student(&id, 1, 1), None)
        .await
        .expect("insert should succeed");

    let err = store
        .put(&make_student(&id, 9, 9), None)
        .await
        .expect_err("second insert should fail");
    assert!(
        matches!(err, StorageError::AlreadyExists { .. }),
        "expected AlreadyExists, got {err:?}"
    );
    assert_eq!(store.get(&id).await.unwrap().remaining_times(), 1);
}

pub async fn test_versioned_update<S: StudentStore>(store: &S) {
    let id = unique_id();
    store
        .put(&make_student(&id, 10, 10), None)
        .await
        .expect("insert should succeed");

    let updated = store
        .put(&make_student(&id, 9, 10), Some(1))
        .await
        .expect("update should succeed");
    assert_eq!(updated.version, 2);

    let fetched = store.get(&id).await.unwrap();
    assert_eq!(fetched.version, 2);
    assert_eq!(fetched.remaining_times(), 9);
}

pub async fn test_stale_version_conflicts<S: StudentStore>(store: &S) {
    let id = unique_id();
    store.put(&make_student(&id, 10, 10), None).await.unwrap();
    store.put(&make_student(&id, 9, 10), Some(1)).await.unwrap();

    let err = store
        .put(&make_student(&id, 8, 10), Some(1))
        .await
        .expect_err("stale write should fail");
    match err {
        StorageError::VersionConflict { expected, actual } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected VersionConflict, got {other:?}"),
    }
    assert_eq!(store.get(&id).await.unwrap().remaining_times(), 9);
}

pub async fn test_update_nonexistent<S: StudentStore>(store: &S) {
    let err = store
        .put(&make_student(&unique_id(), 1, 1), Some(1))
        .await
        .expect_err("update of missing student should fail");
    assert!(
        matches!(err, StorageError::NotFound { .. }),
        "expected NotFound, got {err:?}"
    );
}

pub async fn test_stored_version_ignores_payload_version<S: StudentStore>(store: &S) {
    let id = unique_id();
    let mut student = make_student(&id, 3, 3);
    student.version = 42;

    let stored = store.put(&student, None).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(store.get(&id).await.unwrap().version, 1);
}

// =============================================================================
// StudentStore::list tests
// =============================================================================

pub async fn test_list_sorted_by_id<S: StudentStore>(store: &S) {
    let prefix = unique_id();
    for suffix in ["c", "a", "b"] {
        store
            .put(&make_student(&format!("{prefix}_{suffix}"), 1, 1), None)
            .await
            .unwrap();
    }

    let ids: Vec<String> = store
        .list()
        .await
        .expect("list should succeed")
        .into_iter()
        .map(|s| s.id)
        .filter(|id| id.starts_with(&prefix))
        .collect();
    assert_eq!(
        ids,
        vec![
            format!("{prefix}_a"),
            format!("{prefix}_b"),
            format!("{prefix}_c")
        ]
    );
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all StudentStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_student_store_tests {
    ($store:expr) => {
        use $crate::storage::student_store_tests::*;

        test_get_nonexistent($store).await;
        println!("  test_get_nonexistent: PASSED");

        test_insert_and_get($store).await;
        println!("  test_insert_and_get: PASSED");

        test_insert_existing_rejected($store).await;
        println!("  test_insert_existing_rejected: PASSED");

        test_versioned_update($store).await;
        println!("  test_versioned_update: PASSED");

        test_stale_version_conflicts($store).await;
        println!("  test_stale_version_conflicts: PASSED");

        test_update_nonexistent($store).await;
        println!("  test_update_nonexistent: PASSED");

        test_stored_version_ignores_payload_version($store).await;
        println!("  test_stored_version_ignores_payload_version: PASSED");

        test_list_sorted_by_id($store).await;
        println!("  test_list_sorted_by_id: PASSED");
    };
}
