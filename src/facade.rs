//! Backoffice facade for in-process use.
//!
//! Bundles the ledger engine and the lead pipeline over one set of stores,
//! which is the surface the dashboard's request handlers call into.
//!
//! # Example
//!
//! ```ignore
//! use stride::config::Config;
//! use stride::facade::Backoffice;
//!
//! let backoffice = Backoffice::open(&Config::load(None)?).await?;
//! let student = backoffice.get_student("S1").await?;
//! ```

use crate::config::Config;
use crate::error::{Error, EventDurability, Result};
use crate::ledger::{ConsumptionRequest, LedgerEngine, Reconciliation, ReplenishmentRequest};
use crate::models::{Lead, LeadProfile, Student};
use crate::pipeline::{LeadPipeline, PipelineStats, TouchpointDraft};
use crate::storage::{init_storage, Stores};

/// The core operations exposed to the surrounding application.
pub struct Backoffice {
    ledger: LedgerEngine,
    pipeline: LeadPipeline,
    stores: Stores,
}

impl Backoffice {
    /// Open the configured storage backend and build both components.
    pub async fn open(
        config: &Config,
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let stores = init_storage(&config.storage).await?;
        Ok(Self::with_stores(stores, config))
    }

    /// Build over existing stores.
    pub fn with_stores(stores: Stores, config: &Config) -> Self {
        Self {
            ledger: LedgerEngine::new(&stores, &config.ledger),
            pipeline: LeadPipeline::new(&stores, &config.pipeline),
            stores,
        }
    }

    /// In-memory stores with default settings.
    pub fn in_memory() -> Self {
        Self::with_stores(Stores::in_memory(), &Config::for_test())
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    pub fn pipeline(&self) -> &LeadPipeline {
        &self.pipeline
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn apply_consumption(&self, request: ConsumptionRequest) -> Result<Vec<Student>> {
        self.ledger.apply_consumption(request).await
    }

    pub async fn apply_replenishment(&self, request: ReplenishmentRequest) -> Result<Student> {
        self.ledger.apply_replenishment(request).await
    }

    pub async fn record_touchpoint(&self, lead_id: &str, draft: TouchpointDraft) -> Result<Lead> {
        self.pipeline.record_touchpoint(lead_id, draft).await
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Student> {
        self.ledger.get_student(student_id).await
    }

    pub async fn get_lead(&self, lead_id: &str) -> Result<Lead> {
        self.pipeline.get_lead(lead_id).await
    }

    pub async fn capture_lead(&self, profile: LeadProfile) -> Result<Lead> {
        self.pipeline.capture_lead(profile).await
    }

    pub async fn pipeline_stats(&self) -> Result<PipelineStats> {
        self.pipeline.stats().await
    }

    /// Active students under the configured renewal threshold.
    pub async fn low_balance_students(&self) -> Result<Vec<Student>> {
        self.ledger
            .low_balance_students(self.ledger.low_balance_threshold())
            .await
    }

    /// Reconcile every stored student.
    pub async fn audit(&self) -> Result<Vec<Reconciliation>> {
        let students = self
            .stores
            .students
            .list()
            .await
            .map_err(|e| Error::from_storage(e, EventDurability::NotRecorded))?;

        let mut results = Vec::with_capacity(students.len());
        for student in students {
            results.push(self.ledger.reconcile(&student.id).await?);
        }
        Ok(results)
    }
}
