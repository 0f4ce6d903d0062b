//! Student storage interface.

use async_trait::async_trait;

use super::event_log::Result;
use crate::models::Student;

/// Interface for student persistence.
///
/// Writes are versioned: `put` only succeeds when the stored version equals
/// `expected_version`, which makes the balance read-modify-write safe across
/// processes.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Retrieve a student by id.
    ///
    /// Returns `StorageError::NotFound` if no student has this id.
    async fn get(&self, id: &str) -> Result<Student>;

    /// Store a student.
    ///
    /// `expected_version` of `None` inserts and fails with `AlreadyExists` if
    /// the id is taken. `Some(v)` replaces the stored record only if its
    /// version is still `v`, failing with `VersionConflict` otherwise.
    /// Returns the stored student with its new version.
    async fn put(&self, student: &Student, expected_version: Option<u64>) -> Result<Student>;

    /// List all students.
    async fn list(&self) -> Result<Vec<Student>>;
}
