//! Typed complaint endpoints over [`SessionClient`]
//!
//! Implements the core crate's gateway ports, so the controller and the
//! assignment tracker talk to the backend through this adapter.

use std::sync::Arc;

use async_trait::async_trait;
use civiclink_core::assignment::AssignmentGateway;
use civiclink_core::complaints::ComplaintsGateway;
use civiclink_domain::{
    AssignComplaintRequest, AssignmentReceipt, Complaint, ComplaintPage, ComplaintQuery, Result,
};
use tracing::debug;

use crate::session::SessionClient;

/// Complaint endpoints of the CMS backend.
pub struct ComplaintsApi {
    session: Arc<SessionClient>,
}

impl ComplaintsApi {
    #[must_use]
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// Fetch one page of the complaints list.
    ///
    /// # Errors
    /// `Validation` for malformed paging; otherwise the session client's
    /// taxonomy.
    pub async fn fetch_complaints(&self, query: &ComplaintQuery) -> Result<ComplaintPage> {
        query.validate()?;
        debug!(page = query.page, search = %query.search, "fetching complaints page");
        self.session.get(&Self::list_path(query)).await
    }

    /// Fetch one complaint by id.
    ///
    /// # Errors
    /// The session client's taxonomy.
    pub async fn fetch_complaint(&self, id: i64) -> Result<Complaint> {
        self.session.get(&format!("/complaints/{id}")).await
    }

    /// Submit an assignment.
    ///
    /// # Errors
    /// The session client's taxonomy.
    pub async fn assign_complaint(
        &self,
        request: &AssignComplaintRequest,
    ) -> Result<AssignmentReceipt> {
        self.session.post("/complaints/assign", request).await
    }

    fn list_path(query: &ComplaintQuery) -> String {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.page_size.to_string()),
        ];
        if !query.search.is_empty() {
            params.push(("search", query.search.clone()));
        }
        if !query.filters.statuses.is_empty() {
            let statuses = query
                .filters
                .statuses
                .iter()
                .map(|status| status.as_str())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("status", statuses));
        }
        if let Some(zone) = &query.filters.zone {
            params.push(("zone", zone.clone()));
        }
        if let Some(department) = &query.filters.department {
            params.push(("department", department.clone()));
        }
        if let Some(priority) = query.filters.priority {
            params.push(("priority", priority.to_string()));
        }

        let encoded = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("/complaints?{encoded}")
    }
}

#[async_trait]
impl ComplaintsGateway for ComplaintsApi {
    async fn fetch_page(&self, query: &ComplaintQuery) -> Result<ComplaintPage> {
        self.fetch_complaints(query).await
    }
}

#[async_trait]
impl AssignmentGateway for ComplaintsApi {
    async fn assign(&self, request: &AssignComplaintRequest) -> Result<AssignmentReceipt> {
        self.assign_complaint(request).await
    }
}
