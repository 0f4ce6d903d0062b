//! Domain records shared by the ledger engine and the lead pipeline.
//!
//! Enumerated labels accept both their snake_case names and the labels used
//! by the front-desk dashboard, so values coming straight from the UI parse
//! without a translation table at the call site.

mod lead;
mod records;
mod student;

pub use lead::{ContactMethod, FollowUpTouchpoint, Lead, LeadProfile, LeadStatus};
pub use records::{Attendance, ConsumptionEvent, Performance, ReplenishmentEvent, SessionDetails};
pub use student::{Student, StudentStatus};

/// An enumerated label that matched none of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized {kind}: {value:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
