//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CivicLink client operations
///
/// Every failure an operation can surface falls into one of these kinds.
/// `SessionExpired` is special: it is expected to propagate to the
/// process-wide auth boundary and force re-authentication rather than being
/// shown in place.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ApiError {
    /// Login rejected by the backend
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Refresh failed, or a retried call still reported expiry
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Transport or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed request parameters caught before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-2xx status, malformed payload, or application-level failure
    #[error("Server error: {0}")]
    Server(String),
}

impl ApiError {
    /// The generic expiry error used when the backend supplied no message.
    #[must_use]
    pub fn session_expired() -> Self {
        Self::SessionExpired("session expired".to_string())
    }

    /// Stable label suitable for metrics and structured logging.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::SessionExpired(_) => "session_expired",
            Self::Network(_) => "network",
            Self::Validation(_) => "validation",
            Self::Server(_) => "server",
        }
    }

    /// Whether this error must bubble up to the auth boundary and force a
    /// fresh login instead of being rendered in place.
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// Whether re-invoking the same operation can plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server(_))
    }
}

/// Result type alias for CivicLink operations
pub type Result<T> = std::result::Result<T, ApiError>;
