//! List query types: search text, filter set, paging.

use serde::{Deserialize, Serialize};

use super::complaint::ComplaintStatus;
use crate::errors::{ApiError, Result};

/// Default page size for list queries.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Complete filter set for the complaints list.
///
/// Applying filters always supplies the whole set; there is no field-by-field
/// merge across updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilters {
    #[serde(default)]
    pub statuses: Vec<ComplaintStatus>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl ComplaintFilters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
            && self.zone.is_none()
            && self.department.is_none()
            && self.priority.is_none()
    }
}

/// One immutable list query. A submitted query is never mutated; page turns
/// and filter changes produce a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintQuery {
    pub search: String,
    pub filters: ComplaintFilters,
    pub page: u32,
    pub page_size: u32,
}

impl ComplaintQuery {
    /// Empty query for the first page.
    #[must_use]
    pub fn first_page(page_size: u32) -> Self {
        Self { search: String::new(), filters: ComplaintFilters::default(), page: 1, page_size }
    }

    /// Same query pointed at a different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self { page, ..self.clone() }
    }

    /// Reject malformed paging before any network call is made.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` when `page < 1` or `page_size == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(ApiError::Validation(format!("page must be >= 1, got {}", self.page)));
        }
        if self.page_size == 0 {
            return Err(ApiError::Validation("page_size must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for ComplaintQuery {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}
