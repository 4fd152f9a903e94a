//! Completion form state
//!
//! The mutable record a technician or office user edits before pressing
//! Save. Fields fall into bands: identity (stable customer data), job
//! control (status and visit attribution), installation (only meaningful
//! when the visit is marked Done), the item ledger and captured media.

use crate::models::media::{MediaAsset, MediaKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Office-side job order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Field visit outcome (only meaningful when the job is Confirmed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnsiteStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Reschedule,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "Pending",
            JobStatus::Confirmed => "Confirmed",
            JobStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

impl fmt::Display for OnsiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OnsiteStatus::InProgress => "In Progress",
            OnsiteStatus::Done => "Done",
            OnsiteStatus::Reschedule => "Reschedule",
            OnsiteStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// One row of equipment or material consumed by the installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItem {
    /// Item name; the reconciliation key
    #[serde(alias = "item_name")]
    pub identity: String,
    pub quantity: u32,
}

impl LedgerItem {
    pub fn new(identity: impl Into<String>, quantity: u32) -> Self {
        Self {
            identity: identity.into(),
            quantity,
        }
    }
}

/// The record being edited
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionForm {
    pub job_id: String,
    /// Originating service application, when known at load time
    pub application_id: Option<String>,

    // Identity
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub install_address: String,
    pub landmark: String,
    pub plan: String,

    // Job control
    pub status: Option<JobStatus>,
    pub onsite_status: Option<OnsiteStatus>,
    pub visit_by: String,
    pub visit_with: String,
    /// Free-text companion name when `visit_with` is "Others"
    pub visit_with_other: String,
    pub onsite_remarks: String,
    /// Reason for a reschedule, failure or cancellation
    pub status_remarks: String,

    // Installation
    pub connection_type: String,
    pub router_model: String,
    pub modem_sn: String,
    pub region: String,
    pub city: String,
    pub barangay: String,
    pub location: String,
    pub lcp: String,
    pub nap: String,
    pub port: String,
    pub vlan: String,
    /// `"lat,lng"`
    pub coordinates: String,
    pub ip_address: String,

    pub items: Vec<LedgerItem>,

    /// Pending bytes never round-trip through JSON; they are attached at
    /// capture time (see `FormSession::attach_media`).
    pub media: BTreeMap<MediaKind, MediaAsset>,
}

impl CompletionForm {
    /// Confirmed + Done: the submit that installs the service
    pub fn is_completing(&self) -> bool {
        self.status == Some(JobStatus::Confirmed) && self.onsite_status == Some(OnsiteStatus::Done)
    }

    /// "First Middle Last" with blank parts dropped
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
