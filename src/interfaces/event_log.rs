//! Append-only event log interfaces.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ConsumptionEvent, ReplenishmentEvent};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Storage timed out: {0}")]
    Timeout(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    /// A concurrent writer moved the entity; re-read and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }

    /// The write may or may not have landed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StorageError::Timeout(_))
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StorageError::Timeout(err.to_string()),
            other => StorageError::Database(other),
        }
    }
}

/// Interface for consumption-event persistence ("records").
///
/// Append-only: there is no update or delete entry point.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one event. A second append with the same id is `AlreadyExists`.
    async fn append(&self, event: &ConsumptionEvent) -> Result<()>;

    /// Whether an event with this id has been durably stored.
    async fn contains(&self, id: Uuid) -> Result<bool>;

    /// All events for a student, in append order.
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ConsumptionEvent>>;
}

/// Interface for replenishment-event persistence ("renewals").
///
/// Append-only: there is no update or delete entry point.
#[async_trait]
pub trait RenewalStore: Send + Sync {
    /// Append one event. A second append with the same id is `AlreadyExists`.
    async fn append(&self, event: &ReplenishmentEvent) -> Result<()>;

    /// Whether an event with this id has been durably stored.
    async fn contains(&self, id: Uuid) -> Result<bool>;

    /// All events for a student, in append order.
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ReplenishmentEvent>>;
}
