//! SQLite LeadStore implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::VersionedTable;
use crate::models::Lead;
use crate::storage::schema::{Leads, CREATE_LEADS_TABLE};
use crate::storage::{LeadStore, Result};

const LEADS: VersionedTable<Leads> = VersionedTable {
    table: Leads::Table,
    id: Leads::Id,
    version: Leads::Version,
    data: Leads::LeadData,
};

/// SQLite implementation of LeadStore.
///
/// History is part of the lead payload, so a touchpoint append and the
/// status change it carries are one row update.
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    /// Create a new SQLite lead store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_LEADS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn get(&self, id: &str) -> Result<Lead> {
        LEADS.get(&self.pool, id).await
    }

    async fn put(&self, lead: &Lead, expected_version: Option<u64>) -> Result<Lead> {
        LEADS.put(&self.pool, lead, expected_version).await
    }

    async fn list(&self) -> Result<Vec<Lead>> {
        LEADS.list(&self.pool).await
    }
}
