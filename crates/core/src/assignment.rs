//! Assignment mutations with explicit pending/committed/failed phases
//!
//! An assignment is shown optimistically while the backend call is in
//! flight, but the optimistic value is tracked as `Pending` with the prior
//! assignee retained; failure rolls the assignee back instead of leaving the
//! unconfirmed value in place.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use civiclink_domain::{ApiError, AssignComplaintRequest, AssignmentReceipt, Result};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Trait for submitting assignments to the backend
#[async_trait]
pub trait AssignmentGateway: Send + Sync {
    /// Submit one assignment request.
    async fn assign(&self, request: &AssignComplaintRequest) -> Result<AssignmentReceipt>;
}

/// Where a single assignment mutation stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationPhase {
    /// Sent to the backend, not yet confirmed.
    Pending,
    /// Confirmed by the backend.
    Committed,
    /// Rejected; the prior assignee has been restored.
    Failed(ApiError),
}

#[derive(Debug, Clone)]
struct AssignmentEntry {
    /// Officer currently shown as assignee (`None` = unassigned).
    assignee: Option<i64>,
    phase: MutationPhase,
}

/// Tracks per-complaint assignee state through the mutation lifecycle.
pub struct AssignmentTracker {
    gateway: Arc<dyn AssignmentGateway>,
    entries: Mutex<HashMap<i64, AssignmentEntry>>,
}

impl AssignmentTracker {
    #[must_use]
    pub fn new(gateway: Arc<dyn AssignmentGateway>) -> Self {
        Self { gateway, entries: Mutex::new(HashMap::new()) }
    }

    /// Assignee currently shown for a complaint, if any mutation touched it.
    #[must_use]
    pub fn assignee(&self, complaint_id: i64) -> Option<i64> {
        self.entries.lock().get(&complaint_id).and_then(|entry| entry.assignee)
    }

    /// Phase of the most recent mutation for a complaint.
    #[must_use]
    pub fn phase(&self, complaint_id: i64) -> Option<MutationPhase> {
        self.entries.lock().get(&complaint_id).map(|entry| entry.phase.clone())
    }

    /// Submit an assignment.
    ///
    /// The new assignee becomes visible immediately as `Pending`; on failure
    /// the prior assignee is restored and the error recorded as `Failed`.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` when a mutation for the same complaint
    /// is already in flight, or the gateway's error when the backend rejects
    /// the assignment.
    pub async fn submit(&self, request: AssignComplaintRequest) -> Result<AssignmentReceipt> {
        let prior = {
            let mut entries = self.entries.lock();
            let entry = entries
                .entry(request.complaint_id)
                .or_insert(AssignmentEntry { assignee: None, phase: MutationPhase::Committed });
            if entry.phase == MutationPhase::Pending {
                return Err(ApiError::Validation(format!(
                    "assignment for complaint {} already in flight",
                    request.complaint_id
                )));
            }
            let prior = entry.assignee;
            entry.assignee = request.user_id;
            entry.phase = MutationPhase::Pending;
            prior
        };

        debug!(complaint_id = request.complaint_id, "submitting assignment");
        match self.gateway.assign(&request).await {
            Ok(receipt) => {
                let mut entries = self.entries.lock();
                if let Some(entry) = entries.get_mut(&request.complaint_id) {
                    entry.phase = MutationPhase::Committed;
                }
                Ok(receipt)
            }
            Err(err) => {
                warn!(
                    complaint_id = request.complaint_id,
                    error = %err,
                    "assignment rejected; rolling back"
                );
                let mut entries = self.entries.lock();
                if let Some(entry) = entries.get_mut(&request.complaint_id) {
                    entry.assignee = prior;
                    entry.phase = MutationPhase::Failed(err.clone());
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct ScriptedGateway {
        calls: AtomicUsize,
        outcome: Result<AssignmentReceipt>,
    }

    impl ScriptedGateway {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(AssignmentReceipt {
                    message: "Assigned".to_string(),
                    assigned_to_user_id: Some(31),
                }),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(ApiError::Server("officer not in department".into())),
            }
        }
    }

    #[async_trait]
    impl AssignmentGateway for ScriptedGateway {
        async fn assign(&self, _request: &AssignComplaintRequest) -> Result<AssignmentReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn successful_assignment_commits() {
        let tracker = AssignmentTracker::new(Arc::new(ScriptedGateway::succeeding()));

        let receipt =
            tracker.submit(AssignComplaintRequest::to_user(9, 31)).await.unwrap();

        assert_eq!(receipt.message, "Assigned");
        assert_eq!(tracker.assignee(9), Some(31));
        assert_eq!(tracker.phase(9), Some(MutationPhase::Committed));
    }

    #[tokio::test]
    async fn failed_assignment_rolls_back_to_prior_assignee() {
        let gateway = Arc::new(ScriptedGateway::succeeding());
        let tracker = AssignmentTracker::new(gateway);
        tracker.submit(AssignComplaintRequest::to_user(9, 31)).await.unwrap();

        let failing = AssignmentTracker {
            gateway: Arc::new(ScriptedGateway::failing()),
            entries: Mutex::new(tracker.entries.lock().clone()),
        };
        let result = failing.submit(AssignComplaintRequest::to_user(9, 77)).await;

        assert!(matches!(result, Err(ApiError::Server(_))));
        // Prior assignee restored, not the unconfirmed 77.
        assert_eq!(failing.assignee(9), Some(31));
        assert!(matches!(failing.phase(9), Some(MutationPhase::Failed(_))));
    }

    #[tokio::test]
    async fn failed_first_assignment_restores_unassigned() {
        let tracker = AssignmentTracker::new(Arc::new(ScriptedGateway::failing()));

        let result = tracker.submit(AssignComplaintRequest::to_user(4, 12)).await;

        assert!(result.is_err());
        assert_eq!(tracker.assignee(4), None);
    }

    #[tokio::test]
    async fn in_flight_assignment_for_same_complaint_is_rejected() {
        let tracker = AssignmentTracker::new(Arc::new(ScriptedGateway::succeeding()));
        tracker
            .entries
            .lock()
            .insert(9, AssignmentEntry { assignee: Some(1), phase: MutationPhase::Pending });

        let result = tracker.submit(AssignComplaintRequest::to_user(9, 31)).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        // The rejected submit must not have touched the pending entry.
        assert_eq!(tracker.assignee(9), Some(1));
    }

    #[tokio::test]
    async fn untouched_complaint_has_no_phase() {
        let tracker = AssignmentTracker::new(Arc::new(ScriptedGateway::succeeding()));
        assert_eq!(tracker.phase(123), None);
        assert_eq!(tracker.assignee(123), None);
    }
}
