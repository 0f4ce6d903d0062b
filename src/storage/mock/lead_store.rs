//! Mock LeadStore implementation.

use async_trait::async_trait;

use super::{InjectedFailure, VersionedMap};
use crate::models::Lead;
use crate::storage::{LeadStore, Result};

/// Mock lead store that keeps leads in memory.
#[derive(Default)]
pub struct MockLeadStore {
    inner: VersionedMap<Lead>,
}

impl MockLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_get(&self, failure: Option<InjectedFailure>) {
        self.inner.set_fail_on_get(failure).await;
    }

    pub async fn set_fail_on_put(&self, failure: Option<InjectedFailure>) {
        self.inner.set_fail_on_put(failure).await;
    }

    pub async fn clear_failures(&self) {
        self.inner.clear_failures().await;
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn get(&self, id: &str) -> Result<Lead> {
        self.inner.get(id).await
    }

    async fn put(&self, lead: &Lead, expected_version: Option<u64>) -> Result<Lead> {
        self.inner.put(lead, expected_version).await
    }

    async fn list(&self) -> Result<Vec<Lead>> {
        Ok(self.inner.list().await)
    }
}
