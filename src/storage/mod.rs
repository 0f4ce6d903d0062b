//! Storage implementations.

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};

pub mod helpers;
pub mod mock;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use crate::interfaces::{
    LeadStore, RecordStore, RenewalStore, Result, StorageError, StudentStore,
};
pub use mock::{MockLeadStore, MockRecordStore, MockRenewalStore, MockStudentStore};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteLeadStore, SqliteRecordStore, SqliteRenewalStore, SqliteStudentStore};

/// The four stores the core reads and writes.
#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn StudentStore>,
    pub records: Arc<dyn RecordStore>,
    pub renewals: Arc<dyn RenewalStore>,
    pub leads: Arc<dyn LeadStore>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            students: Arc::new(MockStudentStore::new()),
            records: Arc::new(MockRecordStore::new()),
            renewals: Arc::new(MockRenewalStore::new()),
            leads: Arc::new(MockLeadStore::new()),
        }
    }

    /// SQLite-backed stores sharing one pool, with schemas created.
    #[cfg(feature = "sqlite")]
    pub async fn sqlite(pool: sqlx::SqlitePool) -> Result<Self> {
        let students = SqliteStudentStore::new(pool.clone());
        students.init().await?;
        let records = SqliteRecordStore::new(pool.clone());
        records.init().await?;
        let renewals = SqliteRenewalStore::new(pool.clone());
        renewals.init().await?;
        let leads = SqliteLeadStore::new(pool);
        leads.init().await?;

        Ok(Self {
            students: Arc::new(students),
            records: Arc::new(records),
            renewals: Arc::new(renewals),
            leads: Arc::new(leads),
        })
    }
}

/// Initialize storage based on configuration.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Stores, Box<dyn std::error::Error + Send + Sync>> {
    match config.storage_type {
        StorageType::Memory => {
            info!("Storage: in-memory");
            Ok(Stores::in_memory())
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let path = &config.sqlite.path;
            info!("Storage: sqlite at {}", path);

            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let pool = sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(config.sqlite.max_connections)
                .connect(&format!("sqlite:{}?mode=rwc", path))
                .await?;

            Ok(Stores::sqlite(pool).await?)
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("SQLite feature not enabled".into())
        }
    }
}
