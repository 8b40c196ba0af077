//! Port interfaces for the complaints list
//!
//! These traits define the boundary between list logic and whatever executes
//! the fetch (the HTTP adapter in production, scripted doubles in tests).

use async_trait::async_trait;
use civiclink_domain::{ComplaintPage, ComplaintQuery, Result};

/// Trait for fetching pages of the complaints list
#[async_trait]
pub trait ComplaintsGateway: Send + Sync {
    /// Fetch one page of complaints for the given query.
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<ComplaintPage>;
}
