//! Lead follow-up pipeline.
//!
//! The only writer of a lead's status, follow-up date and history. A
//! touchpoint is prepended to the history and moves the status in the same
//! versioned write, so `status == history[0].status` always holds for a
//! stored lead. Any stage may follow any other.

mod stats;

pub use stats::PipelineStats;

use std::sync::Arc;

use backon::ExponentialBuilder;
use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::{Error, EventDurability, Result};
use crate::interfaces::{LeadStore, StorageError};
use crate::models::{ContactMethod, FollowUpTouchpoint, Lead, LeadProfile, LeadStatus};
use crate::storage::Stores;
use crate::utils::locks::KeyedLocks;
use crate::utils::retry::retry_on_conflict;

/// A touchpoint to record against a lead.
#[derive(Debug, Clone)]
pub struct TouchpointDraft {
    pub time: NaiveDate,
    pub method: ContactMethod,
    pub content: String,
    pub feedback: String,
    /// Stage the lead moves to.
    pub status: LeadStatus,
    /// Not required to fall after `time`.
    pub next_follow_up: NaiveDate,
}

/// Owns lead stage transitions and history.
pub struct LeadPipeline {
    leads: Arc<dyn LeadStore>,
    locks: KeyedLocks,
    backoff: ExponentialBuilder,
}

impl LeadPipeline {
    pub fn new(stores: &Stores, config: &PipelineConfig) -> Self {
        Self {
            leads: stores.leads.clone(),
            locks: KeyedLocks::new(),
            backoff: config.conflict_retry.backoff(),
        }
    }

    /// Store a new pending lead with an empty history.
    #[tracing::instrument(name = "pipeline.capture_lead", skip_all)]
    pub async fn capture_lead(&self, profile: LeadProfile) -> Result<Lead> {
        if profile.name.trim().is_empty() {
            return Err(Error::InvalidArgument("lead name is required".to_string()));
        }

        let lead = Lead::capture(Uuid::new_v4().to_string(), profile);
        let stored = self
            .leads
            .put(&lead, None)
            .await
            .map_err(|e| write_failure(&lead.id, e))?;

        info!(lead_id = %stored.id, "Lead captured");
        Ok(stored)
    }

    /// Replace the profile only; status, follow-up date and history stay.
    #[tracing::instrument(name = "pipeline.edit_profile", skip(self, profile))]
    pub async fn edit_profile(&self, lead_id: &str, profile: LeadProfile) -> Result<Lead> {
        if profile.name.trim().is_empty() {
            return Err(Error::InvalidArgument("lead name is required".to_string()));
        }

        let _guard = self.locks.acquire(lead_id).await;
        let profile = &profile;
        let stored = retry_on_conflict("pipeline.edit_profile", self.backoff, move || async move {
            let current = self.leads.get(lead_id).await?;
            let mut next = current.clone();
            next.profile = profile.clone();

            match self.leads.put(&next, Some(current.version)).await {
                Err(err) if err.is_timeout() => {
                    self.confirm_write(lead_id, current.version, err, |stored| {
                        stored.profile == *profile
                    })
                    .await
                }
                other => other,
            }
        })
        .await
        .map_err(|e| write_failure(lead_id, e))?;

        info!(%lead_id, "Lead profile updated");
        Ok(stored)
    }

    /// Prepend a touchpoint and move the lead to its stage.
    #[tracing::instrument(name = "pipeline.record_touchpoint", skip(self, draft), fields(status = %draft.status))]
    pub async fn record_touchpoint(&self, lead_id: &str, draft: TouchpointDraft) -> Result<Lead> {
        let touchpoint = FollowUpTouchpoint {
            id: Uuid::new_v4(),
            time: draft.time,
            method: draft.method,
            content: draft.content,
            feedback: draft.feedback,
            status: draft.status,
            next_follow_up: draft.next_follow_up,
        };

        let _guard = self.locks.acquire(lead_id).await;
        let touchpoint = &touchpoint;
        let stored = retry_on_conflict(
            "pipeline.record_touchpoint",
            self.backoff,
            move || async move {
                let current = self.leads.get(lead_id).await?;
                let mut next = current.clone();
                next.push_touchpoint(touchpoint.clone());

                match self.leads.put(&next, Some(current.version)).await {
                    Err(err) if err.is_timeout() => {
                        self.confirm_write(lead_id, current.version, err, |stored| {
                            stored.history().iter().any(|t| t.id == touchpoint.id)
                        })
                        .await
                    }
                    other => other,
                }
            },
        )
        .await
        .map_err(|e| write_failure(lead_id, e))?;

        info!(%lead_id, status = %stored.status(), "Touchpoint recorded");
        Ok(stored)
    }

    /// After a timed-out put, decide from a fresh read whether it landed.
    async fn confirm_write<F>(
        &self,
        lead_id: &str,
        expected_version: u64,
        timeout: StorageError,
        landed: F,
    ) -> std::result::Result<Lead, StorageError>
    where
        F: FnOnce(&Lead) -> bool,
    {
        match self.leads.get(lead_id).await {
            Ok(stored) if stored.version > expected_version && landed(&stored) => {
                warn!(%lead_id, "Lead write timed out but landed");
                Ok(stored)
            }
            Ok(_) => Err(timeout),
            Err(read_err) => {
                error!(%lead_id, "Could not confirm timed-out write: {}", read_err);
                Err(timeout)
            }
        }
    }

    pub async fn get_lead(&self, lead_id: &str) -> Result<Lead> {
        self.leads
            .get(lead_id)
            .await
            .map_err(|e| Error::from_storage(e, EventDurability::NotRecorded))
    }

    /// Counts by stage across every lead.
    pub async fn stats(&self) -> Result<PipelineStats> {
        let leads = self
            .leads
            .list()
            .await
            .map_err(|e| Error::from_storage(e, EventDurability::NotRecorded))?;
        Ok(PipelineStats::from_leads(&leads))
    }
}

/// A timed-out write that was not seen on re-read may still land later.
fn write_failure(lead_id: &str, err: StorageError) -> Error {
    let durability = if err.is_timeout() {
        EventDurability::Unknown
    } else {
        EventDurability::NotRecorded
    };
    if !matches!(err, StorageError::NotFound { .. }) {
        error!(%lead_id, "Lead write failed: {}", err);
    }
    Error::from_storage(err, durability)
}
