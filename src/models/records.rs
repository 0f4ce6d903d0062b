//! Immutable ledger events: credit consumption and replenishment.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ParseError, Student};

/// Default time slot for batch attendance entry.
pub const DEFAULT_TIME_SLOT: &str = "16:00-17:30";

/// Attendance outcome of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attendance {
    #[default]
    Present,
    OnLeave,
    Absent,
}

impl FromStr for Attendance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "present" | "出勤" => Ok(Self::Present),
            "on_leave" | "请假" => Ok(Self::OnLeave),
            "absent" | "缺勤" => Ok(Self::Absent),
            other => Err(ParseError::new("attendance", other)),
        }
    }
}

/// Coach's rating of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Excellent,
    #[default]
    Good,
    Fair,
    Unrated,
}

impl FromStr for Performance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "excellent" | "优秀" => Ok(Self::Excellent),
            "good" | "良好" => Ok(Self::Good),
            "fair" | "一般" => Ok(Self::Fair),
            "unrated" | "-" => Ok(Self::Unrated),
            other => Err(ParseError::new("performance", other)),
        }
    }
}

/// Session metadata shared by every event in one attendance action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub course_name: String,
    pub coach: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub attendance: Attendance,
    pub performance: Performance,
}

impl SessionDetails {
    /// Session with the batch-entry defaults: default slot, present, rated good.
    pub fn new(course_name: impl Into<String>, coach: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            course_name: course_name.into(),
            coach: coach.into(),
            date,
            time_slot: DEFAULT_TIME_SLOT.to_string(),
            attendance: Attendance::default(),
            performance: Performance::default(),
        }
    }
}

/// Credits deducted from one student for one session. Never edited; a
/// correction is a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionEvent {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub session: SessionDetails,
    pub times: u32,
    /// Student version written by the balance update this event belongs to.
    #[serde(default)]
    pub applied_version: u64,
    pub recorded_at: DateTime<Utc>,
}

impl ConsumptionEvent {
    /// Event for a deduction already written to `student`.
    pub fn new(student: &Student, times: u32, session: SessionDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            session,
            times,
            applied_version: student.version,
            recorded_at: Utc::now(),
        }
    }
}

/// Credits granted to a student by a renewal payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentEvent {
    pub id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub course_name: String,
    pub amount_paid: Decimal,
    pub times: u32,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub payment_method: String,
    /// Student version written by the balance update this event belongs to.
    #[serde(default)]
    pub applied_version: u64,
    pub recorded_at: DateTime<Utc>,
}
