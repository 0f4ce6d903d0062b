//! Pure utility functions.
//!
//! Tracing setup, per-key locking and conflict retry shared by the ledger
//! and the lead pipeline.

pub mod bootstrap;
pub mod locks;
pub mod retry;
