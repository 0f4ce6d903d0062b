//! Lead storage interface.

use async_trait::async_trait;

use super::event_log::Result;
use crate::models::Lead;

/// Interface for lead persistence.
///
/// Same versioned-write contract as [`super::StudentStore`]. A lead is
/// stored as one record, so its status, follow-up date and history always
/// land together.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Retrieve a lead by id.
    async fn get(&self, id: &str) -> Result<Lead>;

    /// Store a lead, checking `expected_version` (`None` = insert).
    async fn put(&self, lead: &Lead, expected_version: Option<u64>) -> Result<Lead>;

    /// List all leads.
    async fn list(&self) -> Result<Vec<Lead>>;
}
