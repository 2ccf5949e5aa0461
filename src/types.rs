// 💳 Credit Limit Applications - domain types
//
// An Application is the operator's unit of work: a client asking for a new
// credit limit. A ChangeLogEntry is the audit record left behind when an
// edit actually changes something.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LIMIT CONSTANTS
// ============================================================================

/// Lowest limit an operator may set
pub const MIN_LIMIT: i64 = 0;

/// Highest limit an operator may set
pub const MAX_LIMIT: i64 = 10_000_000;

/// Limits strictly above this need a reason and unlock "Special risk"
pub const HIGH_LIMIT_THRESHOLD: i64 = 1_000_000;

// ============================================================================
// APPLICATION STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    New,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::New,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Next status in display order (wraps around)
    pub fn next(&self) -> Self {
        match self {
            ApplicationStatus::New => ApplicationStatus::Approved,
            ApplicationStatus::Approved => ApplicationStatus::Rejected,
            ApplicationStatus::Rejected => ApplicationStatus::New,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ApplicationStatus::New => ApplicationStatus::Rejected,
            ApplicationStatus::Approved => ApplicationStatus::New,
            ApplicationStatus::Rejected => ApplicationStatus::Approved,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(ApplicationStatus::New),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

// ============================================================================
// CHANGE REASON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    IncomeIncrease,
    GoodCreditHistory,
    CustomerRequest,
    /// Only offered for limits above HIGH_LIMIT_THRESHOLD
    SpecialRisk,
}

/// Reasons offered for ordinary limits
pub const STANDARD_REASONS: &[ChangeReason] = &[
    ChangeReason::IncomeIncrease,
    ChangeReason::GoodCreditHistory,
    ChangeReason::CustomerRequest,
];

/// Reasons offered once the limit crosses HIGH_LIMIT_THRESHOLD
pub const EXTENDED_REASONS: &[ChangeReason] = &[
    ChangeReason::IncomeIncrease,
    ChangeReason::GoodCreditHistory,
    ChangeReason::CustomerRequest,
    ChangeReason::SpecialRisk,
];

impl ChangeReason {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeReason::IncomeIncrease => "Income increase",
            ChangeReason::GoodCreditHistory => "Good credit history",
            ChangeReason::CustomerRequest => "Customer request",
            ChangeReason::SpecialRisk => "Special risk",
        }
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChangeReason {
    type Err = String;

    /// Accepts either the label ("Special risk") or the wire name ("special_risk")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        EXTENDED_REASONS
            .iter()
            .copied()
            .find(|reason| reason.label().to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown reason: {}", s))
    }
}

// ============================================================================
// APPLICATION
// ============================================================================

/// Credit-limit change request
///
/// `id` is identity and never changes. `account` is never edited here, only
/// masked for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default = "default_id")]
    pub id: String,
    pub name: String,
    pub account: String,
    pub current_limit: u64,
    pub requested_limit: u64,
    pub currency: String,
    pub status: ApplicationStatus,
}

fn default_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Application {
    /// Apply a partial update, returning the patched copy
    pub fn patched(&self, patch: &ApplicationPatch) -> Application {
        let mut next = self.clone();
        if let Some(limit) = patch.current_limit {
            next.current_limit = limit;
        }
        if let Some(limit) = patch.requested_limit {
            next.requested_limit = limit;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        next
    }
}

/// Partial update accepted by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationPatch {
    pub fn is_empty(&self) -> bool {
        self.current_limit.is_none() && self.requested_limit.is_none() && self.status.is_none()
    }
}

/// What the operator committed from the edit form
///
/// The reason is only used for validation; it is not written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    pub new_limit: u64,
    #[serde(default)]
    pub reason: Option<ChangeReason>,
    pub new_status: ApplicationStatus,
}

impl From<ApplicationUpdate> for ApplicationPatch {
    fn from(update: ApplicationUpdate) -> Self {
        ApplicationPatch {
            current_limit: Some(update.new_limit),
            requested_limit: None,
            status: Some(update.new_status),
        }
    }
}

// ============================================================================
// CHANGE LOG
// ============================================================================

/// Audit record for one committed edit
///
/// `client_id` and `client_name` are copies taken when the entry is created,
/// so later edits to the application never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub client_id: String,
    pub client_name: String,
    pub description: String,
}

/// Log entry before the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub client_id: String,
    pub client_name: String,
    pub description: String,
}
