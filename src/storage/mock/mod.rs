//! In-memory storage implementations.
//!
//! Used for the `memory` storage type and throughout the test suites. Each
//! store can be told to fail specific calls so callers can exercise their
//! persistence-failure and timeout paths.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::helpers::{next_version, not_found, Versioned};
use super::{Result, StorageError};

mod event_log;
mod lead_store;
mod student_store;

pub use event_log::{MockRecordStore, MockRenewalStore};
pub use lead_store::MockLeadStore;
pub use student_store::MockStudentStore;

/// Failure injected into a mock store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Fail without writing anything.
    Unavailable,
    /// Report a timeout without writing anything.
    TimeoutBeforeWrite,
    /// Perform the write, then report a timeout.
    TimeoutAfterWrite,
}

impl InjectedFailure {
    fn error(self, op: &str) -> StorageError {
        match self {
            InjectedFailure::Unavailable => {
                StorageError::Unavailable(format!("injected failure on {op}"))
            }
            InjectedFailure::TimeoutBeforeWrite | InjectedFailure::TimeoutAfterWrite => {
                StorageError::Timeout(format!("injected timeout on {op}"))
            }
        }
    }

    fn writes(self) -> bool {
        matches!(self, InjectedFailure::TimeoutAfterWrite)
    }
}

/// Failures keyed by entity id, with an optional catch-all.
#[derive(Debug, Default)]
struct FailurePlan {
    all: Option<InjectedFailure>,
    by_key: HashMap<String, InjectedFailure>,
}

impl FailurePlan {
    fn lookup(&self, key: &str) -> Option<InjectedFailure> {
        self.by_key.get(key).copied().or(self.all)
    }
}

/// Versioned entity map shared by the student and lead mocks.
struct VersionedMap<T> {
    entries: RwLock<HashMap<String, T>>,
    get_failures: RwLock<FailurePlan>,
    put_failures: RwLock<FailurePlan>,
}

impl<T> Default for VersionedMap<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            get_failures: RwLock::new(FailurePlan::default()),
            put_failures: RwLock::new(FailurePlan::default()),
        }
    }
}

impl<T: Versioned> VersionedMap<T> {
    async fn get(&self, id: &str) -> Result<T> {
        if let Some(failure) = self.get_failures.read().await.lookup(id) {
            return Err(failure.error("get"));
        }
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    async fn put(&self, entity: &T, expected_version: Option<u64>) -> Result<T> {
        let failure = self.put_failures.read().await.lookup(entity.id());
        if let Some(failure) = failure.filter(|f| !f.writes()) {
            return Err(failure.error("put"));
        }

        let mut entries = self.entries.write().await;
        let stored_version = entries.get(entity.id()).map(Versioned::version);
        let version = next_version::<T>(entity.id(), stored_version, expected_version)?;

        let mut stored = entity.clone();
        stored.set_version(version);
        entries.insert(stored.id().to_string(), stored.clone());

        match failure {
            Some(failure) => Err(failure.error("put")),
            None => Ok(stored),
        }
    }

    async fn list(&self) -> Vec<T> {
        let mut all: Vec<T> = self.entries.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    async fn set_fail_on_get(&self, failure: Option<InjectedFailure>) {
        self.get_failures.write().await.all = failure;
    }

    async fn set_fail_on_put(&self, failure: Option<InjectedFailure>) {
        self.put_failures.write().await.all = failure;
    }

    async fn fail_put_for(&self, id: &str, failure: InjectedFailure) {
        self.put_failures
            .write()
            .await
            .by_key
            .insert(id.to_string(), failure);
    }

    async fn clear_failures(&self) {
        *self.get_failures.write().await = FailurePlan::default();
        *self.put_failures.write().await = FailurePlan::default();
    }
}
