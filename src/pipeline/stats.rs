//! Pipeline summary counts.

use std::collections::HashMap;

use crate::models::{Lead, LeadStatus};

/// Lead counts by stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    by_status: HashMap<LeadStatus, usize>,
    pub total: usize,
}

impl PipelineStats {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let mut by_status: HashMap<LeadStatus, usize> =
            LeadStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for lead in leads {
            *by_status.entry(lead.status()).or_default() += 1;
        }
        Self {
            by_status,
            total: leads.len(),
        }
    }

    pub fn count(&self, status: LeadStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Leads not yet signed, lost ones included.
    pub fn open(&self) -> usize {
        self.total - self.count(LeadStatus::Signed)
    }

    /// Signed share of all leads as a rounded percentage.
    pub fn conversion_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let signed = self.count(LeadStatus::Signed) as f64;
        (signed / self.total as f64 * 100.0).round() as u32
    }
}
