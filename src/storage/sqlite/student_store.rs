//! SQLite StudentStore implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::VersionedTable;
use crate::models::Student;
use crate::storage::schema::{Students, CREATE_STUDENTS_TABLE};
use crate::storage::{Result, StudentStore};

const STUDENTS: VersionedTable<Students> = VersionedTable {
    table: Students::Table,
    id: Students::Id,
    version: Students::Version,
    data: Students::StudentData,
};

/// SQLite implementation of StudentStore.
pub struct SqliteStudentStore {
    pool: SqlitePool,
}

impl SqliteStudentStore {
    /// Create a new SQLite student store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_STUDENTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentStore for SqliteStudentStore {
    async fn get(&self, id: &str) -> Result<Student> {
        STUDENTS.get(&self.pool, id).await
    }

    async fn put(&self, student: &Student, expected_version: Option<u64>) -> Result<Student> {
        STUDENTS.put(&self.pool, student, expected_version).await
    }

    async fn list(&self) -> Result<Vec<Student>> {
        STUDENTS.list(&self.pool).await
    }
}
