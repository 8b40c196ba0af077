//! Assignment request/response payloads.

use serde::{Deserialize, Serialize};

/// Request to route a complaint to a department, division, or officer.
///
/// The backend accepts any subset of the target fields; absent fields are
/// omitted from the payload entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignComplaintRequest {
    pub complaint_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AssignComplaintRequest {
    /// Assign directly to an officer.
    #[must_use]
    pub fn to_user(complaint_id: i64, user_id: i64) -> Self {
        Self { complaint_id, user_id: Some(user_id), department_id: None, division_id: None, comment: None }
    }
}

/// Confirmation returned by the assignment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    pub message: String,
    #[serde(default)]
    pub assigned_to_user_id: Option<i64>,
}
