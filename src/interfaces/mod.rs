//! Abstract interfaces for stride components.
//!
//! These traits define the contracts for:
//! - Student storage (versioned balance records)
//! - Consumption and replenishment event logs (append-only)
//! - Lead storage (versioned, history embedded)

pub mod event_log;
pub mod lead_store;
pub mod student_store;

pub use event_log::{RecordStore, RenewalStore, Result, StorageError};
pub use lead_store::LeadStore;
pub use student_store::StudentStore;
