//! Complaint list types and the status vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend complaint status vocabulary.
///
/// Closed enum: a status string outside this set deserializes to `Unknown`
/// instead of being guessed into a known bucket. Legacy backends emit `open`
/// for freshly filed complaints, so it is accepted as an alias of
/// `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[serde(alias = "open")]
    Submitted,
    Assigned,
    InProgress,
    Resolved,
    Closed,
    /// Catch-all for statuses this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ComplaintStatus {
    /// Wire spelling used in query parameters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }

    /// Total mapping into the UI display vocabulary.
    ///
    /// `Unknown` stays `Unknown` so a backend contract change surfaces to the
    /// caller instead of masquerading as an open complaint.
    #[must_use]
    pub fn ui_status(self) -> UiStatus {
        match self {
            Self::Submitted => UiStatus::Open,
            Self::Assigned | Self::InProgress => UiStatus::InProgress,
            Self::Resolved => UiStatus::Resolved,
            Self::Closed => UiStatus::Closed,
            Self::Unknown => UiStatus::Unknown,
        }
    }
}

/// Display vocabulary used by UI status chips and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Unknown,
}

impl UiStatus {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        }
    }
}

/// One complaint row as served by the list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub complaint_number: String,
    pub complainant_name: String,
    #[serde(default)]
    pub contact_no: Option<String>,
    pub description: String,
    pub location_address: String,
    pub status: ComplaintStatus,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photos: bool,
    #[serde(default)]
    pub videos: bool,
    #[serde(default)]
    pub documents: bool,
}

/// Server-reported paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of the complaints list.
///
/// `pagination` is optional because older backend builds omit it; callers
/// fall back to comparing the item count against the requested page size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintPage {
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}
