//! Complaints list controller
//!
//! Owns the query state (search text, filter set, page) for the complaints
//! list and reconciles asynchronous fetch results against the *current*
//! query. Every search or filter change bumps a generation counter; a fetch
//! result tagged with a superseded generation is discarded instead of being
//! cancelled mid-flight, so rapid typing and filter toggling can never
//! surface stale rows.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use civiclink_domain::{
    ApiError, Complaint, ComplaintFilters, ComplaintPage, ComplaintQuery, ComplaintStatus, Result,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ports::ComplaintsGateway;

/// Read-only view of the complaints list for the UI layer.
///
/// The UI never mutates `items` directly; it re-reads a snapshot after each
/// operation completes.
#[derive(Debug, Clone)]
pub struct ListState {
    /// Rows currently visible, unique by complaint id.
    pub items: Vec<Complaint>,
    /// Last page applied to `items`.
    pub page: u32,
    /// Whether the backend has more pages for the current query.
    pub has_more: bool,
    /// A fetch is in flight for the current generation.
    pub is_loading: bool,
    /// Classified failure of the most recent fetch, if any. A failed load
    /// never wipes previously shown rows.
    pub error: Option<ApiError>,
}

impl ListState {
    fn empty() -> Self {
        Self { items: Vec::new(), page: 1, has_more: false, is_loading: false, error: None }
    }
}

struct Inner {
    query: ComplaintQuery,
    list: ListState,
}

/// Controller for one paginated, filtered, searchable complaints list.
///
/// Operations return the spawned fetch task's [`JoinHandle`] so callers (and
/// tests) can await quiescence; the UI is free to ignore it.
pub struct ComplaintListController {
    gateway: Arc<dyn ComplaintsGateway>,
    inner: Arc<Mutex<Inner>>,
    generation: Arc<AtomicU64>,
}

impl ComplaintListController {
    /// Create a controller with an empty query at the given page size.
    #[must_use]
    pub fn new(gateway: Arc<dyn ComplaintsGateway>, page_size: u32) -> Self {
        Self {
            gateway,
            inner: Arc::new(Mutex::new(Inner {
                query: ComplaintQuery::first_page(page_size),
                list: ListState::empty(),
            })),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current list state, cloned for the UI.
    #[must_use]
    pub fn snapshot(&self) -> ListState {
        self.inner.lock().list.clone()
    }

    /// Current query, cloned.
    #[must_use]
    pub fn query(&self) -> ComplaintQuery {
        self.inner.lock().query.clone()
    }

    /// Current query generation. Non-decreasing; strictly increases only on
    /// search/filter changes and explicit resets.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Replace the search text and fetch page 1 of the new query.
    pub fn set_search_text(&self, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        self.begin_new_query(move |query| query.search = text)
    }

    /// Replace the whole filter set and fetch page 1 of the new query.
    pub fn apply_filters(&self, filters: ComplaintFilters) -> JoinHandle<()> {
        self.begin_new_query(move |query| query.filters = filters)
    }

    /// Drop all filters and fetch page 1 of the unfiltered query.
    pub fn clear_filters(&self) -> JoinHandle<()> {
        self.begin_new_query(|query| query.filters = ComplaintFilters::default())
    }

    /// Fetch the next page at the current generation.
    ///
    /// No-op (returns `None`) while a fetch is in flight or when the backend
    /// reported no further pages, which also swallows duplicate
    /// scroll-triggers.
    pub fn load_more(&self) -> Option<JoinHandle<()>> {
        let (query, generation) = {
            let mut inner = self.inner.lock();
            if inner.list.is_loading || !inner.list.has_more {
                debug!(
                    is_loading = inner.list.is_loading,
                    has_more = inner.list.has_more,
                    "load_more ignored"
                );
                return None;
            }
            inner.list.is_loading = true;
            let query = inner.query.with_page(inner.list.page + 1);
            inner.query = query.clone();
            (query, self.generation.load(Ordering::SeqCst))
        };
        Some(self.spawn_fetch(query, generation))
    }

    /// Re-fetch page 1 at the current generation (pull-to-refresh).
    ///
    /// Does not bump the generation: a concurrent `load_more` result for this
    /// generation is still legitimate, and the page-1 reconciliation replaces
    /// `items` wholesale on success.
    pub fn refresh(&self) -> JoinHandle<()> {
        let (query, generation) = {
            let mut inner = self.inner.lock();
            inner.list.is_loading = true;
            (inner.query.with_page(1), self.generation.load(Ordering::SeqCst))
        };
        self.spawn_fetch(query, generation)
    }

    /// Explicitly clear the list without fetching.
    ///
    /// Bumps the generation so any in-flight result is discarded on arrival.
    /// Search text and filters are kept.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        inner.query.page = 1;
        inner.list = ListState::empty();
    }

    /// Bump the generation, rewrite the query, clear the list, and fetch
    /// page 1. All search/filter mutations funnel through here so the
    /// generation and the query state move together under one lock.
    fn begin_new_query(&self, mutate: impl FnOnce(&mut ComplaintQuery)) -> JoinHandle<()> {
        let (query, generation) = {
            let mut inner = self.inner.lock();
            mutate(&mut inner.query);
            inner.query.page = 1;
            inner.list.items.clear();
            inner.list.page = 1;
            inner.list.has_more = false;
            inner.list.is_loading = true;
            inner.list.error = None;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (inner.query.clone(), generation)
        };
        self.spawn_fetch(query, generation)
    }

    fn spawn_fetch(&self, query: ComplaintQuery, generation: u64) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let inner = Arc::clone(&self.inner);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let result = match query.validate() {
                Ok(()) => gateway.fetch_page(&query).await,
                Err(err) => Err(err),
            };
            reconcile(&inner, &current, &query, generation, result);
        })
    }
}

/// Merge or discard one fetch result.
///
/// Page number, not arrival order, decides replace-vs-append: page 1 always
/// replaces `items`, later pages append with id-level de-duplication against
/// the rows already shown.
fn reconcile(
    inner: &Mutex<Inner>,
    current: &AtomicU64,
    query: &ComplaintQuery,
    generation: u64,
    result: Result<ComplaintPage>,
) {
    let mut inner = inner.lock();
    let latest = current.load(Ordering::SeqCst);
    if generation != latest {
        debug!(generation, latest, page = query.page, "discarding stale fetch result");
        return;
    }

    match result {
        Ok(page) => {
            let ComplaintPage { complaints, pagination } = page;
            let received = complaints.len();

            let unknown =
                complaints.iter().filter(|c| c.status == ComplaintStatus::Unknown).count();
            if unknown > 0 {
                warn!(count = unknown, page = query.page, "complaints carry an unrecognized backend status");
            }

            if query.page <= 1 {
                inner.list.items = complaints;
            } else {
                let seen: HashSet<i64> = inner.list.items.iter().map(|c| c.id).collect();
                let before = inner.list.items.len();
                inner
                    .list
                    .items
                    .extend(complaints.into_iter().filter(|c| !seen.contains(&c.id)));
                let appended = inner.list.items.len() - before;
                if appended < received {
                    debug!(
                        dropped = received - appended,
                        page = query.page,
                        "dropped duplicate boundary rows"
                    );
                }
            }

            inner.list.page = query.page;
            inner.list.has_more = pagination
                .as_ref()
                .map_or(received as u32 == query.page_size, |p| p.has_next);
            inner.list.is_loading = false;
            inner.list.error = None;
        }
        Err(err) => {
            warn!(error = %err, page = query.page, "complaints fetch failed");
            inner.list.is_loading = false;
            inner.list.error = Some(err);
        }
    }
}
