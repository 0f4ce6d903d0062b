//! Shared storage integration tests.
//!
//! Tests the StudentStore, LeadStore, RecordStore and RenewalStore interfaces
//! against all implementations. Each implementation module imports these
//! test functions and runs them.

pub mod event_log_tests;
pub mod student_store_tests;
