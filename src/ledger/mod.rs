//! Credit ledger engine.
//!
//! Keeps each student's prepaid credit balance in step with the append-only
//! consumption and replenishment logs. Every balance change is one step per
//! student: write the student with a versioned compare-and-swap, then append
//! the event stamped with the version that write produced. Steps on the same
//! student serialize on a per-student lock and, across processes, on the
//! version check. Steps on different students never wait on each other.

mod balance;

pub use balance::{replay, ReplayedBalance};

use std::future::Future;
use std::sync::Arc;

use backon::ExponentialBuilder;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::{BatchFailure, BatchReport, Error, EventDurability, Result};
use crate::interfaces::{RecordStore, RenewalStore, StorageError, StudentStore};
use crate::models::{
    ConsumptionEvent, ReplenishmentEvent, SessionDetails, Student, StudentStatus,
};
use crate::storage::Stores;
use crate::utils::locks::KeyedLocks;
use crate::utils::retry::retry_on_conflict;

/// Deduct credits from one or more students for a session.
#[derive(Debug, Clone)]
pub struct ConsumptionRequest {
    /// Students attending. Duplicates are applied once.
    pub student_ids: Vec<String>,
    /// Credits deducted from each student.
    pub credits: u32,
    /// Session shared by every event in the request.
    pub session: SessionDetails,
}

/// Grant credits to a student for a renewal payment.
#[derive(Debug, Clone)]
pub struct ReplenishmentRequest {
    pub student_id: String,
    /// Course renewed; the student's enrolled course when `None`.
    pub course_name: Option<String>,
    pub amount_paid: Decimal,
    pub credits: u32,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub payment_method: String,
}

/// Stored balance compared with the balance replayed from the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub student_id: String,
    pub stored_remaining: u32,
    pub stored_total: u32,
    pub replayed: ReplayedBalance,
    pub consumption_events: usize,
    pub replenishment_events: usize,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.stored_remaining == self.replayed.remaining_times
            && self.stored_total == self.replayed.total_times
    }
}

/// Owns every write to a student's `remaining_times` and `total_times`.
pub struct LedgerEngine {
    students: Arc<dyn StudentStore>,
    records: Arc<dyn RecordStore>,
    renewals: Arc<dyn RenewalStore>,
    locks: KeyedLocks,
    backoff: ExponentialBuilder,
    low_balance_threshold: u32,
}

impl LedgerEngine {
    pub fn new(stores: &Stores, config: &LedgerConfig) -> Self {
        Self {
            students: stores.students.clone(),
            records: stores.records.clone(),
            renewals: stores.renewals.clone(),
            locks: KeyedLocks::new(),
            backoff: config.conflict_retry.backoff(),
            low_balance_threshold: config.low_balance_threshold,
        }
    }

    /// Configured renewal alert threshold.
    pub fn low_balance_threshold(&self) -> u32 {
        self.low_balance_threshold
    }

    /// Deduct `credits` from every requested student, one event each.
    ///
    /// Each student is an independent step: one student's failure does not
    /// block the others. A single-student request returns its failure
    /// directly; a multi-student request with any failure returns
    /// [`Error::PartialBatchFailure`] naming every outcome.
    #[tracing::instrument(name = "ledger.apply_consumption", skip_all, fields(count = request.student_ids.len(), credits = request.credits))]
    pub async fn apply_consumption(&self, request: ConsumptionRequest) -> Result<Vec<Student>> {
        if request.credits == 0 {
            return Err(Error::InvalidArgument(
                "credits per student must be positive".to_string(),
            ));
        }

        let mut student_ids: Vec<String> = Vec::with_capacity(request.student_ids.len());
        for id in request.student_ids {
            if !student_ids.contains(&id) {
                student_ids.push(id);
            }
        }
        if student_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one student is required".to_string(),
            ));
        }

        let credits = request.credits;
        let session = &request.session;
        let outcomes = join_all(
            student_ids
                .iter()
                .map(|id| self.consume_one(id, credits, session)),
        )
        .await;

        if student_ids.len() == 1 {
            return outcomes
                .into_iter()
                .next()
                .unwrap_or_else(|| Err(Error::InvalidArgument("empty batch".to_string())))
                .map(|student| vec![student]);
        }

        let mut report = BatchReport::default();
        for (student_id, outcome) in student_ids.into_iter().zip(outcomes) {
            match outcome {
                Ok(student) => report.succeeded.push(student),
                Err(error) => report.failed.push(BatchFailure { student_id, error }),
            }
        }

        if report.failed.is_empty() {
            Ok(report.succeeded)
        } else {
            warn!(
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                "Consumption batch partially failed"
            );
            Err(Error::PartialBatchFailure(report))
        }
    }

    async fn consume_one(
        &self,
        student_id: &str,
        credits: u32,
        session: &SessionDetails,
    ) -> Result<Student> {
        let _guard = self.locks.acquire(student_id).await;

        let updated = self
            .write_balance(student_id, |s| s.deduct(credits))
            .await
            .map_err(|e| balance_failure(student_id, e))?;

        let event = ConsumptionEvent::new(&updated, credits, session.clone());
        settle_append(self.records.append(&event).await, || {
            self.records.contains(event.id)
        })
        .await?;

        info!(
            %student_id,
            credits,
            remaining = updated.remaining_times(),
            version = updated.version,
            "Consumption applied"
        );
        Ok(updated)
    }

    /// Grant credits to one student. Remaining and lifetime credits move in
    /// the same write.
    #[tracing::instrument(name = "ledger.apply_replenishment", skip_all, fields(student_id = %request.student_id, credits = request.credits))]
    pub async fn apply_replenishment(&self, request: ReplenishmentRequest) -> Result<Student> {
        if request.credits == 0 {
            return Err(Error::InvalidArgument(
                "credits granted must be positive".to_string(),
            ));
        }
        if request.amount_paid.is_sign_negative() && !request.amount_paid.is_zero() {
            return Err(Error::InvalidArgument(format!(
                "amount paid must not be negative: {}",
                request.amount_paid
            )));
        }
        if request.valid_until < request.valid_from {
            return Err(Error::InvalidArgument(format!(
                "validity window ends before it starts: {} > {}",
                request.valid_from, request.valid_until
            )));
        }

        let student_id = request.student_id.as_str();
        let _guard = self.locks.acquire(student_id).await;

        let credits = request.credits;
        let updated = self
            .write_balance(student_id, |s| s.grant(credits))
            .await
            .map_err(|e| balance_failure(student_id, e))?;

        let event = ReplenishmentEvent {
            id: Uuid::new_v4(),
            student_id: updated.id.clone(),
            student_name: updated.name.clone(),
            course_name: request
                .course_name
                .clone()
                .unwrap_or_else(|| updated.course_name.clone()),
            amount_paid: request.amount_paid,
            times: credits,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
            payment_method: request.payment_method.clone(),
            applied_version: updated.version,
            recorded_at: Utc::now(),
        };
        settle_append(self.renewals.append(&event).await, || {
            self.renewals.contains(event.id)
        })
        .await?;

        info!(
            %student_id,
            credits,
            remaining = updated.remaining_times(),
            total = updated.total_times(),
            version = updated.version,
            "Replenishment applied"
        );
        Ok(updated)
    }

    /// Re-read the student, apply `change`, and write it back guarded by the
    /// version that was read. Conflicts re-read and re-apply.
    async fn write_balance<F>(
        &self,
        student_id: &str,
        change: F,
    ) -> std::result::Result<Student, StorageError>
    where
        F: Fn(&mut Student),
    {
        let change = &change;
        retry_on_conflict("ledger.write_balance", self.backoff, move || async move {
            let current = self.students.get(student_id).await?;
            let mut next = current.clone();
            change(&mut next);

            match self.students.put(&next, Some(current.version)).await {
                Ok(stored) => Ok(stored),
                Err(err) if err.is_timeout() => {
                    self.confirm_balance_write(&next, current.version, err)
                        .await
                }
                Err(err) => Err(err),
            }
        })
        .await
    }

    /// After a timed-out put, decide from a fresh read whether it landed.
    async fn confirm_balance_write(
        &self,
        intended: &Student,
        expected_version: u64,
        timeout: StorageError,
    ) -> std::result::Result<Student, StorageError> {
        match self.students.get(&intended.id).await {
            Ok(stored)
                if stored.version == expected_version + 1 && stored.same_balance(intended) =>
            {
                warn!(student_id = %intended.id, "Student write timed out but landed");
                Ok(stored)
            }
            Ok(_) => Err(timeout),
            Err(read_err) => {
                error!(student_id = %intended.id, "Could not confirm timed-out write: {}", read_err);
                Err(timeout)
            }
        }
    }

    /// Current balance and status of a student.
    pub async fn get_student(&self, student_id: &str) -> Result<Student> {
        self.students
            .get(student_id)
            .await
            .map_err(|e| Error::from_storage(e, EventDurability::NotRecorded))
    }

    /// Replay the student's events and compare with the stored balance.
    #[tracing::instrument(name = "ledger.reconcile", skip(self))]
    pub async fn reconcile(&self, student_id: &str) -> Result<Reconciliation> {
        let student = self.get_student(student_id).await?;
        let consumptions = self
            .records
            .list_for_student(student_id)
            .await
            .map_err(read_failure)?;
        let replenishments = self
            .renewals
            .list_for_student(student_id)
            .await
            .map_err(read_failure)?;

        let reconciliation = Reconciliation {
            student_id: student.id.clone(),
            stored_remaining: student.remaining_times(),
            stored_total: student.total_times(),
            replayed: replay(&consumptions, &replenishments),
            consumption_events: consumptions.len(),
            replenishment_events: replenishments.len(),
        };

        if !reconciliation.is_consistent() {
            warn!(
                %student_id,
                stored_remaining = reconciliation.stored_remaining,
                replayed_remaining = reconciliation.replayed.remaining_times,
                stored_total = reconciliation.stored_total,
                replayed_total = reconciliation.replayed.total_times,
                "Balance does not match event history"
            );
        }
        Ok(reconciliation)
    }

    /// Active students with fewer than `threshold` credits, lowest first.
    pub async fn low_balance_students(&self, threshold: u32) -> Result<Vec<Student>> {
        let mut students: Vec<Student> = self
            .students
            .list()
            .await
            .map_err(read_failure)?
            .into_iter()
            .filter(|s| s.status == StudentStatus::Active && s.remaining_times() < threshold)
            .collect();
        students.sort_by_key(Student::remaining_times);
        Ok(students)
    }

    /// Credits consumed by a student across every recorded session.
    pub async fn total_consumed(&self, student_id: &str) -> Result<u64> {
        let events = self
            .records
            .list_for_student(student_id)
            .await
            .map_err(read_failure)?;
        Ok(events.iter().map(|e| u64::from(e.times)).sum())
    }
}

fn read_failure(err: StorageError) -> Error {
    Error::from_storage(err, EventDurability::NotRecorded)
}

/// A failed balance write left no event behind. A timed-out write that was
/// not seen on re-read may still land later.
fn balance_failure(student_id: &str, err: StorageError) -> Error {
    let durability = if err.is_timeout() {
        EventDurability::Unknown
    } else {
        EventDurability::NotRecorded
    };
    if !matches!(err, StorageError::NotFound { .. }) {
        error!(%student_id, "Balance update failed: {}", err);
    }
    Error::from_storage(err, durability)
}

/// Resolve the append that follows a written balance, checking the log when
/// the store timed out.
async fn settle_append<F, Fut>(
    result: std::result::Result<(), StorageError>,
    contains: F,
) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<bool, StorageError>>,
{
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_timeout() => match contains().await {
            Ok(true) => {
                warn!("Event append timed out but landed");
                Ok(())
            }
            Ok(false) => {
                error!("Balance applied but event append timed out and was not stored: {}", err);
                Err(Error::persistence(err, EventDurability::BalanceApplied))
            }
            Err(check) => {
                error!("Could not confirm timed-out append: {}", check);
                Err(Error::persistence(err, EventDurability::Unknown))
            }
        },
        Err(err) => {
            error!("Balance applied but event append failed: {}", err);
            Err(Error::persistence(err, EventDurability::BalanceApplied))
        }
    }
}
