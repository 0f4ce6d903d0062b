//! SQLite RecordStore and RenewalStore implementations.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::EventTable;
use crate::models::{ConsumptionEvent, ReplenishmentEvent};
use crate::storage::schema::{
    ConsumptionEvents, ReplenishmentEvents, CREATE_CONSUMPTION_EVENTS_TABLE,
    CREATE_REPLENISHMENT_EVENTS_TABLE,
};
use crate::storage::{RecordStore, RenewalStore, Result};

const CONSUMPTION_EVENTS: EventTable<ConsumptionEvents> = EventTable {
    entity: "consumption event",
    table: ConsumptionEvents::Table,
    seq: ConsumptionEvents::Seq,
    id: ConsumptionEvents::Id,
    student_id: ConsumptionEvents::StudentId,
    recorded_at: ConsumptionEvents::RecordedAt,
    data: ConsumptionEvents::EventData,
};

const REPLENISHMENT_EVENTS: EventTable<ReplenishmentEvents> = EventTable {
    entity: "replenishment event",
    table: ReplenishmentEvents::Table,
    seq: ReplenishmentEvents::Seq,
    id: ReplenishmentEvents::Id,
    student_id: ReplenishmentEvents::StudentId,
    recorded_at: ReplenishmentEvents::RecordedAt,
    data: ReplenishmentEvents::EventData,
};

/// SQLite implementation of RecordStore.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new SQLite consumption-event log.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_CONSUMPTION_EVENTS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn append(&self, event: &ConsumptionEvent) -> Result<()> {
        CONSUMPTION_EVENTS
            .append(
                &self.pool,
                event.id,
                &event.student_id,
                &event.recorded_at.to_rfc3339(),
                event,
            )
            .await
    }

    async fn contains(&self, id: Uuid) -> Result<bool> {
        CONSUMPTION_EVENTS.contains(&self.pool, id).await
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ConsumptionEvent>> {
        CONSUMPTION_EVENTS
            .list_for_student(&self.pool, student_id)
            .await
    }
}

/// SQLite implementation of RenewalStore.
pub struct SqliteRenewalStore {
    pool: SqlitePool,
}

impl SqliteRenewalStore {
    /// Create a new SQLite replenishment-event log.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_REPLENISHMENT_EVENTS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RenewalStore for SqliteRenewalStore {
    async fn append(&self, event: &ReplenishmentEvent) -> Result<()> {
        REPLENISHMENT_EVENTS
            .append(
                &self.pool,
                event.id,
                &event.student_id,
                &event.recorded_at.to_rfc3339(),
                event,
            )
            .await
    }

    async fn contains(&self, id: Uuid) -> Result<bool> {
        REPLENISHMENT_EVENTS.contains(&self.pool, id).await
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ReplenishmentEvent>> {
        REPLENISHMENT_EVENTS
            .list_for_student(&self.pool, student_id)
            .await
    }
}
