//! Backend factory for interface tests.
//!
//! Builds the backoffice over the storage backend named by `STORAGE_BACKEND`.

use std::env;

use stride::config::Config;
use stride::facade::Backoffice;
use stride::storage::Stores;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl StorageBackend {
    pub fn from_env() -> Self {
        match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StorageBackend::Sqlite,
            _ => StorageBackend::Memory,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

/// The backoffice under test, with direct store access for setup.
pub struct StorageContext {
    pub backoffice: Backoffice,
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext")
            .field("backoffice", &"<Backoffice>")
            .finish()
    }
}

impl StorageContext {
    /// Create a fresh context for the configured backend.
    pub async fn new(backend: StorageBackend) -> Self {
        let stores = match backend {
            StorageBackend::Memory => Stores::in_memory(),
            StorageBackend::Sqlite => Self::create_sqlite().await,
        };
        StorageContext {
            backoffice: Backoffice::with_stores(stores, &Config::for_test()),
        }
    }

    #[cfg(feature = "sqlite")]
    async fn create_sqlite() -> Stores {
        use sqlx::sqlite::SqlitePoolOptions;

        // Every `:memory:` connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create SQLite pool");

        Stores::sqlite(pool)
            .await
            .expect("Failed to create SQLite schema")
    }

    #[cfg(not(feature = "sqlite"))]
    async fn create_sqlite() -> Stores {
        panic!("SQLite feature not enabled. Build with --features sqlite");
    }
}
