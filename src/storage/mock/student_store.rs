//! Mock StudentStore implementation.

use async_trait::async_trait;

use super::{InjectedFailure, VersionedMap};
use crate::models::Student;
use crate::storage::{Result, StudentStore};

/// Mock student store that keeps students in memory.
#[derive(Default)]
pub struct MockStudentStore {
    inner: VersionedMap<Student>,
}

impl MockStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_get(&self, failure: Option<InjectedFailure>) {
        self.inner.set_fail_on_get(failure).await;
    }

    pub async fn set_fail_on_put(&self, failure: Option<InjectedFailure>) {
        self.inner.set_fail_on_put(failure).await;
    }

    /// Fail every `put` of this student until failures are cleared.
    pub async fn fail_put_for(&self, id: &str, failure: InjectedFailure) {
        self.inner.fail_put_for(id, failure).await;
    }

    pub async fn clear_failures(&self) {
        self.inner.clear_failures().await;
    }
}

#[async_trait]
impl StudentStore for MockStudentStore {
    async fn get(&self, id: &str) -> Result<Student> {
        self.inner.get(id).await
    }

    async fn put(&self, student: &Student, expected_version: Option<u64>) -> Result<Student> {
        self.inner.put(student, expected_version).await
    }

    async fn list(&self) -> Result<Vec<Student>> {
        Ok(self.inner.list().await)
    }
}
