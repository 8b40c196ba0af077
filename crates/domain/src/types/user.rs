//! Authenticated user types and login payloads.

use serde::{Deserialize, Serialize};

/// Administrative zone the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
}

/// Department the user is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Profile of the logged-in officer.
///
/// Persisted to the secure store beside the token pair so the profile
/// survives a process restart without a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub zone: Option<Zone>,
    #[serde(default)]
    pub departments: Vec<Department>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Display name, `first last`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Plaintext login request. Sent exactly once per login over the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_parses_camel_case_payload() {
        let json = serde_json::json!({
            "id": 7,
            "username": "je.sharma",
            "email": "je.sharma@example.org",
            "firstName": "Jai",
            "lastName": "Sharma",
            "isActive": true,
            "zone": { "id": 2, "name": "South" },
            "departments": [{ "id": 4, "name": "Street Lighting" }]
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.full_name(), "Jai Sharma");
        assert_eq!(user.zone.as_ref().map(|z| z.id), Some(2));
        assert_eq!(user.departments.len(), 1);
    }
}
