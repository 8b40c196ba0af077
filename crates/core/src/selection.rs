//! One-shot selection exchange between a requesting screen and a picker
//!
//! Replaces a process-global "on selection" callback: each `begin` hands
//! back a receiver tied to that invocation, and a newer request for the same
//! field cancels the older receiver instead of silently overwriting a shared
//! slot.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Broker for pending selections, keyed by field name ("department",
/// "zone", ...). One pending selection per field at a time.
pub struct SelectionBroker<T> {
    pending: Mutex<HashMap<String, oneshot::Sender<T>>>,
}

impl<T> SelectionBroker<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { pending: Mutex::new(HashMap::new()) }
    }

    /// Open a selection for `field` and return the receiver for this
    /// invocation.
    ///
    /// A previous pending selection for the same field is cancelled: its
    /// receiver resolves with [`oneshot::error::RecvError`].
    pub fn begin(&self, field: impl Into<String>) -> oneshot::Receiver<T> {
        let field = field.into();
        let (tx, rx) = oneshot::channel();
        if self.pending.lock().insert(field.clone(), tx).is_some() {
            debug!(field, "superseding pending selection");
        }
        rx
    }

    /// Complete the pending selection for `field` with `value`.
    ///
    /// Returns `false` when nothing was pending or the requester already
    /// dropped its receiver.
    pub fn resolve(&self, field: &str, value: T) -> bool {
        match self.pending.lock().remove(field) {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Abort the pending selection for `field`, if any.
    pub fn cancel(&self, field: &str) -> bool {
        self.pending.lock().remove(field).is_some()
    }

    /// Whether a selection is pending for `field`.
    #[must_use]
    pub fn is_pending(&self, field: &str) -> bool {
        self.pending.lock().contains_key(field)
    }
}

impl<T> Default for SelectionBroker<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_delivers_to_the_requester() {
        let broker = SelectionBroker::new();
        let rx = broker.begin("department");

        assert!(broker.is_pending("department"));
        assert!(broker.resolve("department", 42));
        assert_eq!(rx.await.unwrap(), 42);
        assert!(!broker.is_pending("department"));
    }

    #[tokio::test]
    async fn newer_request_cancels_older_one() {
        let broker = SelectionBroker::new();
        let first = broker.begin("zone");
        let second = broker.begin("zone");

        assert!(broker.resolve("zone", 7));
        // The superseded receiver errors; the fresh one gets the value.
        assert!(first.await.is_err());
        assert_eq!(second.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancel_aborts_the_pending_selection() {
        let broker: SelectionBroker<u32> = SelectionBroker::new();
        let rx = broker.begin("category");

        assert!(broker.cancel("category"));
        assert!(rx.await.is_err());
        assert!(!broker.cancel("category"));
    }

    #[tokio::test]
    async fn resolve_without_pending_selection_is_noop() {
        let broker: SelectionBroker<u32> = SelectionBroker::new();
        assert!(!broker.resolve("department", 1));
    }
}
