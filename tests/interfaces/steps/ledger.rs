//! Ledger engine step definitions.

use chrono::NaiveDate;
use cucumber::{given, then, when, World};
use rust_decimal_macros::dec;

use stride::ledger::{ConsumptionRequest, ReplenishmentRequest};
use stride::models::{SessionDetails, Student};
use stride::storage::{RecordStore, RenewalStore, StudentStore};
use stride::Error;

use crate::backend::{StorageBackend, StorageContext};

/// Test context for ledger scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct LedgerWorld {
    backend: StorageBackend,
    context: Option<StorageContext>,
    last_error: Option<Error>,
}

impl LedgerWorld {
    fn new() -> Self {
        Self {
            backend: StorageBackend::from_env(),
            context: None,
            last_error: None,
        }
    }

    fn ctx(&self) -> &StorageContext {
        self.context
            .as_ref()
            .expect("Storage context not initialized")
    }

    fn session() -> SessionDetails {
        let date = NaiveDate::from_ymd_opt(2024, 10, 8).expect("valid date");
        SessionDetails::new("Basketball", "Coach Zhao", date)
    }

    fn consumption(ids: &str, credits: u32) -> ConsumptionRequest {
        ConsumptionRequest {
            student_ids: ids.split(',').map(|id| id.trim().to_string()).collect(),
            credits,
            session: Self::session(),
        }
    }

    fn replenishment(id: &str, credits: u32) -> ReplenishmentRequest {
        let from = NaiveDate::from_ymd_opt(2024, 10, 1).expect("valid date");
        let until = NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date");
        ReplenishmentRequest {
            student_id: id.to_string(),
            course_name: None,
            amount_paid: dec!(3200),
            credits,
            valid_from: from,
            valid_until: until,
            payment_method: "wechat".to_string(),
        }
    }

    async fn student(&self, id: &str) -> Student {
        self.ctx()
            .backoffice
            .get_student(id)
            .await
            .expect("student should exist")
    }
}

// --- Background ---

#[given("a ledger backend")]
async fn given_ledger_backend(world: &mut LedgerWorld) {
    println!("Using backend: {}", world.backend.name());
    world.context = Some(StorageContext::new(world.backend).await);
}

// --- Given steps ---

#[given(expr = "a student {string} with {int} credits")]
async fn given_student_with_credits(world: &mut LedgerWorld, id: String, credits: u32) {
    let backoffice = &world.ctx().backoffice;
    backoffice
        .stores()
        .students
        .put(&Student::enroll(id.as_str(), format!("Student {id}"), "Basketball"), None)
        .await
        .expect("Failed to enroll student");

    if credits > 0 {
        backoffice
            .apply_replenishment(LedgerWorld::replenishment(&id, credits))
            .await
            .expect("Failed to grant credits");
    }
}

// --- When steps ---

#[when(expr = "I replenish {string} with {int} credits")]
async fn when_replenish(world: &mut LedgerWorld, id: String, credits: u32) {
    let result = world
        .ctx()
        .backoffice
        .apply_replenishment(LedgerWorld::replenishment(&id, credits))
        .await;
    world.last_error = result.err();
}

#[when(expr = "{string} consumes {int} credit(s)")]
async fn when_consumes(world: &mut LedgerWorld, id: String, credits: u32) {
    let result = world
        .ctx()
        .backoffice
        .apply_consumption(LedgerWorld::consumption(&id, credits))
        .await;
    world.last_error = result.err();
}

#[when(expr = "{string} consumes {int} credit(s) twice concurrently")]
async fn when_consumes_concurrently(world: &mut LedgerWorld, id: String, credits: u32) {
    let backoffice = &world.ctx().backoffice;
    let (first, second) = tokio::join!(
        backoffice.apply_consumption(LedgerWorld::consumption(&id, credits)),
        backoffice.apply_consumption(LedgerWorld::consumption(&id, credits)),
    );
    first.expect("first consumption should succeed");
    second.expect("second consumption should succeed");
}

#[when(expr = "students {string} consume {int} credit(s) each")]
async fn when_batch_consumes(world: &mut LedgerWorld, ids: String, credits: u32) {
    let result = world
        .ctx()
        .backoffice
        .apply_consumption(LedgerWorld::consumption(&ids, credits))
        .await;
    world.last_error = result.err();
}

// --- Then steps ---

#[then(expr = "{string} has {int} remaining and {int} total credits")]
async fn then_balance(world: &mut LedgerWorld, id: String, remaining: u32, total: u32) {
    let student = world.student(&id).await;
    assert_eq!(student.remaining_times(), remaining, "remaining credits");
    assert_eq!(student.total_times(), total, "total credits");
}

#[then(expr = "{string} has {int} consumption event(s)")]
async fn then_consumption_events(world: &mut LedgerWorld, id: String, count: usize) {
    let events = world
        .ctx()
        .backoffice
        .stores()
        .records
        .list_for_student(&id)
        .await
        .expect("Failed to list consumption events");
    assert_eq!(events.len(), count);
}

#[then(expr = "{string} has {int} replenishment event(s)")]
async fn then_replenishment_events(world: &mut LedgerWorld, id: String, count: usize) {
    let events = world
        .ctx()
        .backoffice
        .stores()
        .renewals
        .list_for_student(&id)
        .await
        .expect("Failed to list replenishment events");
    assert_eq!(events.len(), count);
}

#[then(expr = "the batch reports {string} succeeded")]
async fn then_batch_succeeded(world: &mut LedgerWorld, ids: String) {
    let Some(Error::PartialBatchFailure(report)) = &world.last_error else {
        panic!("expected a partial batch failure, got {:?}", world.last_error);
    };
    let expected: Vec<&str> = ids.split(',').map(str::trim).collect();
    assert_eq!(report.succeeded_ids(), expected);
}

#[then(expr = "the batch reports {string} as not found")]
async fn then_batch_not_found(world: &mut LedgerWorld, id: String) {
    let Some(Error::PartialBatchFailure(report)) = &world.last_error else {
        panic!("expected a partial batch failure, got {:?}", world.last_error);
    };
    let failure = report
        .failure_for(&id)
        .unwrap_or_else(|| panic!("{id} should have failed"));
    assert!(failure.is_not_found(), "expected NotFound, got {failure:?}");
}

#[then("the operation fails with an invalid argument")]
async fn then_invalid_argument(world: &mut LedgerWorld) {
    assert!(
        matches!(world.last_error, Some(Error::InvalidArgument(_))),
        "expected InvalidArgument, got {:?}",
        world.last_error
    );
}

#[then("the operation fails with not found")]
async fn then_not_found(world: &mut LedgerWorld) {
    assert!(
        world.last_error.as_ref().is_some_and(Error::is_not_found),
        "expected NotFound, got {:?}",
        world.last_error
    );
}

#[then(expr = "the history of {string} reconciles with its balance")]
async fn then_reconciles(world: &mut LedgerWorld, id: String) {
    let reconciliation = world
        .ctx()
        .backoffice
        .ledger()
        .reconcile(&id)
        .await
        .expect("Failed to reconcile");
    assert!(
        reconciliation.is_consistent(),
        "stored balance disagrees with history: {reconciliation:?}"
    );
}
