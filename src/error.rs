//! Errors surfaced by the ledger engine and the lead pipeline.

use std::fmt;

use crate::interfaces::StorageError;
use crate::models::{ParseError, Student};

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Whether the event of a failed operation was durably stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDurability {
    /// The balance was written but its event is missing from the log.
    BalanceApplied,
    /// Nothing was written.
    NotRecorded,
    /// The store could not confirm either way.
    Unknown,
}

impl fmt::Display for EventDurability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EventDurability::BalanceApplied => "balance applied, event not recorded",
            EventDurability::NotRecorded => "event not recorded",
            EventDurability::Unknown => "event state unknown",
        };
        f.write_str(text)
    }
}

/// Core operation errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Persistence failure ({event}): {source}")]
    Persistence {
        #[source]
        source: StorageError,
        event: EventDurability,
    },

    #[error("Batch partially failed: {} succeeded, {} failed", .0.succeeded.len(), .0.failed.len())]
    PartialBatchFailure(BatchReport),
}

impl Error {
    pub(crate) fn persistence(source: StorageError, event: EventDurability) -> Self {
        Error::Persistence { source, event }
    }

    /// Map a storage error, lifting `NotFound` into the core taxonomy.
    pub(crate) fn from_storage(source: StorageError, event: EventDurability) -> Self {
        match source {
            StorageError::NotFound { entity, id } => Error::NotFound { entity, id },
            other => Error::persistence(other, event),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Durability of the event for persistence failures.
    pub fn event_durability(&self) -> Option<EventDurability> {
        match self {
            Error::Persistence { event, .. } => Some(*event),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

/// Per-student outcome of a multi-student consumption.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<Student>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn succeeded_ids(&self) -> Vec<&str> {
        self.succeeded.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.student_id.as_str()).collect()
    }

    /// The failure recorded for a student, if any.
    pub fn failure_for(&self, student_id: &str) -> Option<&Error> {
        self.failed
            .iter()
            .find(|f| f.student_id == student_id)
            .map(|f| &f.error)
    }
}

/// One student's failure inside a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub student_id: String,
    pub error: Error,
}
