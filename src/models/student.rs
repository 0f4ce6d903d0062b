//! Student balance record.

use serde::{Deserialize, Serialize};

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    #[serde(alias = "在训")]
    Active,
    #[serde(alias = "停训")]
    Inactive,
}

/// A student and their prepaid credit balance.
///
/// `remaining_times` and `total_times` are read-only outside the crate: the
/// ledger engine is the only writer. `version` is the optimistic-concurrency
/// token checked by versioned store writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub course_name: String,
    pub status: StudentStatus,
    remaining_times: u32,
    total_times: u32,
    #[serde(default)]
    pub version: u64,
}

impl Student {
    /// A newly enrolled student with no credits.
    pub fn enroll(
        id: impl Into<String>,
        name: impl Into<String>,
        course_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            course_name: course_name.into(),
            status: StudentStatus::Active,
            remaining_times: 0,
            total_times: 0,
            version: 0,
        }
    }

    /// Credits still available.
    pub fn remaining_times(&self) -> u32 {
        self.remaining_times
    }

    /// Lifetime credits granted.
    pub fn total_times(&self) -> u32 {
        self.total_times
    }

    /// Deduct credits, flooring the balance at zero. Debt is not tracked.
    pub(crate) fn deduct(&mut self, credits: u32) {
        self.remaining_times = self.remaining_times.saturating_sub(credits);
    }

    /// Grant credits; both counters move together.
    pub(crate) fn grant(&mut self, credits: u32) {
        self.remaining_times = self.remaining_times.saturating_add(credits);
        self.total_times = self.total_times.saturating_add(credits);
    }

    /// True when the ledger-owned fields match `other`, ignoring the version.
    pub(crate) fn same_balance(&self, other: &Student) -> bool {
        self.remaining_times == other.remaining_times && self.total_times == other.total_times
    }
}
