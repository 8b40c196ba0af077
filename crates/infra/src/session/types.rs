//! Session credential types and the backend response envelope.

use chrono::{DateTime, Duration, Utc};
use civiclink_domain::User;
use serde::{Deserialize, Serialize};

/// Error code the backend uses to signal access-token expiry inside a 2xx
/// response.
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// Bearer credential pair with expiry metadata.
///
/// Access and refresh tokens are set and cleared together; a session either
/// has both or does not exist. That makes the "non-null access implies
/// non-null refresh" invariant structural rather than checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, when the backend reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Build credentials, computing `expires_at` from a lifetime in seconds.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: Option<i64>) -> Self {
        let expires_at =
            expires_in.filter(|secs| *secs > 0).map(|secs| Utc::now() + Duration::seconds(secs));
        Self { access_token, refresh_token, expires_at }
    }

    /// Whether the access token is expired or will expire within the
    /// threshold. Tokens without a known expiry are assumed valid; the
    /// backend's in-band expiry signal is authoritative either way.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }
}

/// Standard `{ success, data, error, message }` envelope the CMS wraps every
/// JSON payload in.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<EnvelopeError>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Structured error block inside a failed envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Whether this is the backend's session-expiry signal: a 2xx envelope
    /// with `success: false` and `error.code == "TOKEN_EXPIRED"`. Any other
    /// failed envelope is an ordinary application-level failure.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        !self.success
            && self.error.as_ref().and_then(|e| e.code.as_deref()) == Some(TOKEN_EXPIRED_CODE)
    }

    /// Backend-provided failure message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|e| e.message.clone())
            .or_else(|| self.message.clone())
            .filter(|msg| !msg.is_empty())
    }

    /// Failure message with a generic fallback.
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.error_message().unwrap_or_else(|| "request failed".to_string())
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Payload of a successful token refresh. The refresh token is rotated only
/// when the backend sends a replacement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}
