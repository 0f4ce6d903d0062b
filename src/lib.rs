//! Stride - credit ledger and lead pipeline
//!
//! Core of a sports-training back office: keeps each student's prepaid
//! lesson-credit balance consistent with the consumption and renewal logs,
//! and moves sales leads through their follow-up stages with an append-only
//! history.

pub mod config;
pub mod error;
pub mod facade;
pub mod interfaces;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
