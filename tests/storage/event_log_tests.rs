//! RecordStore and RenewalStore interface tests.
//!
//! These tests verify the append-only contract of the event logs.
//! Each storage implementation should run these tests.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use stride::models::{
    Attendance, ConsumptionEvent, Performance, ReplenishmentEvent, SessionDetails, Student,
};
use stride::storage::{RecordStore, RenewalStore, StorageError};

fn student() -> Student {
    Student::enroll(format!("test_{}", Uuid::new_v4()), "Li Wei", "Basketball")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

pub fn make_consumption(student: &Student, times: u32, day: u32) -> ConsumptionEvent {
    let mut session = SessionDetails::new("Basketball", "Coach Zhao", date(day));
    session.attendance = Attendance::OnLeave;
    session.performance = Performance::Excellent;
    ConsumptionEvent::new(student, times, session)
}

pub fn make_replenishment(student: &Student, times: u32) -> ReplenishmentEvent {
    ReplenishmentEvent {
        id: Uuid::new_v4(),
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        course_name: student.course_name.clone(),
        amount_paid: dec!(3600.50),
        times,
        valid_from: date(1),
        valid_until: date(30),
        payment_method: "bank transfer".to_string(),
        applied_version: student.version,
        recorded_at: chrono::Utc::now(),
    }
}

// =============================================================================
// RecordStore tests
// =============================================================================

pub async fn test_record_append_preserves_order<S: RecordStore>(store: &S) {
    let student = student();
    let events: Vec<_> = (1..=3)
        .map(|day| make_consumption(&student, day, day))
        .collect();
    for event in &events {
        store.append(event).await.expect("append should succeed");
    }

    let stored = store
        .list_for_student(&student.id)
        .await
        .expect("list should succeed");
    assert_eq!(stored, events);
    assert_eq!(stored[0].session.attendance, Attendance::OnLeave);
}

pub async fn test_record_contains<S: RecordStore>(store: &S) {
    let student = student();
    let event = make_consumption(&student, 1, 2);
    assert!(!store.contains(event.id).await.unwrap());

    store.append(&event).await.unwrap();
    assert!(store.contains(event.id).await.unwrap());
}

pub async fn test_record_rejects_duplicate_id<S: RecordStore>(store: &S) {
    let student = student();
    let event = make_consumption(&student, 1, 4);
    store.append(&event).await.unwrap();

    let err = store.append(&event).await.unwrap_err();
    assert!(
        matches!(err, StorageError::AlreadyExists { .. }),
        "expected AlreadyExists, got {err:?}"
    );
    assert_eq!(store.list_for_student(&student.id).await.unwrap().len(), 1);
}

pub async fn test_record_student_isolation<S: RecordStore>(store: &S) {
    let first = student();
    let second = student();
    store.append(&make_consumption(&first, 1, 3)).await.unwrap();
    store.append(&make_consumption(&second, 2, 3)).await.unwrap();

    let stored = store.list_for_student(&first.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].times, 1);
    assert!(store
        .list_for_student("test_nobody")
        .await
        .unwrap()
        .is_empty());
}

// =============================================================================
// RenewalStore tests
// =============================================================================

pub async fn test_renewal_append_and_list<S: RenewalStore>(store: &S) {
    let student = student();
    let first = make_replenishment(&student, 20);
    let second = make_replenishment(&student, 10);
    store.append(&first).await.expect("append should succeed");
    store.append(&second).await.expect("append should succeed");

    let stored = store.list_for_student(&student.id).await.unwrap();
    assert_eq!(stored, vec![first, second]);
    assert_eq!(stored[0].amount_paid, dec!(3600.50));
}

pub async fn test_renewal_contains<S: RenewalStore>(store: &S) {
    let student = student();
    let event = make_replenishment(&student, 5);
    assert!(!store.contains(event.id).await.unwrap());

    store.append(&event).await.unwrap();
    assert!(store.contains(event.id).await.unwrap());
}

pub async fn test_renewal_rejects_duplicate_id<S: RenewalStore>(store: &S) {
    let student = student();
    let event = make_replenishment(&student, 8);
    store.append(&event).await.unwrap();

    let err = store.append(&event).await.unwrap_err();
    assert!(
        matches!(err, StorageError::AlreadyExists { .. }),
        "expected AlreadyExists, got {err:?}"
    );
    assert_eq!(store.list_for_student(&student.id).await.unwrap().len(), 1);
}

/// Run all RecordStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_record_store_tests {
    ($store:expr) => {
        use $crate::storage::event_log_tests::*;

        test_record_append_preserves_order($store).await;
        println!("  test_record_append_preserves_order: PASSED");

        test_record_contains($store).await;
        println!("  test_record_contains: PASSED");

        test_record_rejects_duplicate_id($store).await;
        println!("  test_record_rejects_duplicate_id: PASSED");

        test_record_student_isolation($store).await;
        println!("  test_record_student_isolation: PASSED");
    };
}

/// Run all RenewalStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_renewal_store_tests {
    ($store:expr) => {
        use $crate::storage::event_log_tests::*;

        test_renewal_append_and_list($store).await;
        println!("  test_renewal_append_and_list: PASSED");

        test_renewal_contains($store).await;
        println!("  test_renewal_contains: PASSED");

        test_renewal_rejects_duplicate_id($store).await;
        println!("  test_renewal_rejects_duplicate_id: PASSED");
    };
}
