//! Sales leads and their follow-up history.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseError;

/// Stage of a lead in the sales pipeline.
///
/// Any stage may follow any other; `signed` and `lost` can be revisited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Pending,
    Trialed,
    Quoted,
    Signed,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::Pending,
        LeadStatus::Trialed,
        LeadStatus::Quoted,
        LeadStatus::Signed,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Trialed => "trialed",
            LeadStatus::Quoted => "quoted",
            LeadStatus::Signed => "signed",
            LeadStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" | "待联系" => Ok(Self::Pending),
            "trialed" | "已试听" => Ok(Self::Trialed),
            "quoted" | "已报价" => Ok(Self::Quoted),
            "signed" | "已签约" => Ok(Self::Signed),
            "lost" | "已流失" => Ok(Self::Lost),
            other => Err(ParseError::new("lead status", other)),
        }
    }
}

/// Channel used for a follow-up contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Phone,
    Wechat,
    InPerson,
}

impl FromStr for ContactMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "phone" | "电话" => Ok(Self::Phone),
            "wechat" | "微信" => Ok(Self::Wechat),
            "in_person" | "到店" => Ok(Self::InPerson),
            other => Err(ParseError::new("contact method", other)),
        }
    }
}

/// One recorded interaction with a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTouchpoint {
    pub id: Uuid,
    pub time: NaiveDate,
    pub method: ContactMethod,
    pub content: String,
    pub feedback: String,
    pub status: LeadStatus,
    pub next_follow_up: NaiveDate,
}

/// Prospect attributes owned by the front-desk CRUD screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadProfile {
    pub name: String,
    pub age: Option<u32>,
    pub phone: String,
    pub wechat: String,
    pub course_type: String,
    pub source: String,
    pub intention: String,
    pub budget: String,
    pub sports_foundation: String,
    pub expected_time: String,
}

/// A sales lead.
///
/// `status`, `next_follow_up` and `history` are only written by the lead
/// pipeline. Whenever history is non-empty, `status == history[0].status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub profile: LeadProfile,
    status: LeadStatus,
    next_follow_up: NaiveDate,
    history: Vec<FollowUpTouchpoint>,
    #[serde(default)]
    pub version: u64,
}

impl Lead {
    /// A freshly captured lead: pending, first follow-up due today (UTC), no
    /// history.
    pub fn capture(id: impl Into<String>, profile: LeadProfile) -> Self {
        Self {
            id: id.into(),
            profile,
            status: LeadStatus::Pending,
            next_follow_up: Utc::now().date_naive(),
            history: Vec::new(),
            version: 0,
        }
    }

    pub fn status(&self) -> LeadStatus {
        self.status
    }

    pub fn next_follow_up(&self) -> NaiveDate {
        self.next_follow_up
    }

    /// Touchpoints, most recent first.
    pub fn history(&self) -> &[FollowUpTouchpoint] {
        &self.history
    }

    /// Prepend a touchpoint and move status and follow-up date with it.
    pub(crate) fn push_touchpoint(&mut self, touchpoint: FollowUpTouchpoint) {
        self.status = touchpoint.status;
        self.next_follow_up = touchpoint.next_follow_up;
        self.history.insert(0, touchpoint);
    }
}
