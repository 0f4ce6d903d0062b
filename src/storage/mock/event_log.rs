//! Mock RecordStore and RenewalStore implementations.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FailurePlan, InjectedFailure};
use crate::models::{ConsumptionEvent, ReplenishmentEvent};
use crate::storage::{RecordStore, RenewalStore, Result, StorageError};

/// Accessors the log needs from an event.
trait LoggedEvent: Clone {
    const ENTITY: &'static str;

    fn event_id(&self) -> Uuid;
    fn student(&self) -> &str;
}

impl LoggedEvent for ConsumptionEvent {
    const ENTITY: &'static str = "consumption event";

    fn event_id(&self) -> Uuid {
        self.id
    }

    fn student(&self) -> &str {
        &self.student_id
    }
}

impl LoggedEvent for ReplenishmentEvent {
    const ENTITY: &'static str = "replenishment event";

    fn event_id(&self) -> Uuid {
        self.id
    }

    fn student(&self) -> &str {
        &self.student_id
    }
}

/// Append-only in-memory log; failures are keyed by student id.
struct EventLog<E> {
    events: RwLock<Vec<E>>,
    append_failures: RwLock<FailurePlan>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            append_failures: RwLock::new(FailurePlan::default()),
        }
    }
}

impl<E: LoggedEvent> EventLog<E> {
    async fn append(&self, event: &E) -> Result<()> {
        let failure = self.append_failures.read().await.lookup(event.student());
        if let Some(failure) = failure.filter(|f| !f.writes()) {
            return Err(failure.error("append"));
        }

        {
            let mut events = self.events.write().await;
            if events.iter().any(|e| e.event_id() == event.event_id()) {
                return Err(StorageError::AlreadyExists {
                    entity: E::ENTITY,
                    id: event.event_id().to_string(),
                });
            }
            events.push(event.clone());
        }

        match failure {
            Some(failure) => Err(failure.error("append")),
            None => Ok(()),
        }
    }

    async fn contains(&self, id: Uuid) -> bool {
        self.events.read().await.iter().any(|e| e.event_id() == id)
    }

    async fn list_for_student(&self, student_id: &str) -> Vec<E> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.student() == student_id)
            .cloned()
            .collect()
    }

    async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    async fn set_fail_on_append(&self, failure: Option<InjectedFailure>) {
        self.append_failures.write().await.all = failure;
    }

    async fn fail_append_for(&self, student_id: &str, failure: InjectedFailure) {
        self.append_failures
            .write()
            .await
            .by_key
            .insert(student_id.to_string(), failure);
    }
}

/// Mock consumption-event log.
#[derive(Default)]
pub struct MockRecordStore {
    log: EventLog<ConsumptionEvent>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events stored across all students.
    pub async fn stored_count(&self) -> usize {
        self.log.len().await
    }

    pub async fn set_fail_on_append(&self, failure: Option<InjectedFailure>) {
        self.log.set_fail_on_append(failure).await;
    }

    pub async fn fail_append_for(&self, student_id: &str, failure: InjectedFailure) {
        self.log.fail_append_for(student_id, failure).await;
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn append(&self, event: &ConsumptionEvent) -> Result<()> {
        self.log.append(event).await
    }

    async fn contains(&self, id: Uuid) -> Result<bool> {
        Ok(self.log.contains(id).await)
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ConsumptionEvent>> {
        Ok(self.log.list_for_student(student_id).await)
    }
}

/// Mock replenishment-event log.
#[derive(Default)]
pub struct MockRenewalStore {
    log: EventLog<ReplenishmentEvent>,
}

impl MockRenewalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events stored across all students.
    pub async fn stored_count(&self) -> usize {
        self.log.len().await
    }

    pub async fn set_fail_on_append(&self, failure: Option<InjectedFailure>) {
        self.log.set_fail_on_append(failure).await;
    }

    pub async fn fail_append_for(&self, student_id: &str, failure: InjectedFailure) {
        self.log.fail_append_for(student_id, failure).await;
    }
}

#[async_trait]
impl RenewalStore for MockRenewalStore {
    async fn append(&self, event: &ReplenishmentEvent) -> Result<()> {
        self.log.append(event).await
    }

    async fn contains(&self, id: Uuid) -> Result<bool> {
        Ok(self.log.contains(id).await)
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ReplenishmentEvent>> {
        Ok(self.log.list_for_student(student_id).await)
    }
}
