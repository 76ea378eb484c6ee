//! The report store and its derived recommendation and insight lists.
//!
//! `ReportStore` owns the fetched reports for the lifetime of a session.
//! Every mutation rebuilds the flattened recommendation and insight lists
//! and bumps `revision`, which views use to decide whether to recompute.
//!
//! Overlapping fetches are resolved by sequence number: each `fetch_all`
//! takes the next number before calling the backend, and on return its
//! response is applied only if no later fetch has been issued meanwhile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use labdash_contracts::{
    error::DashResult,
    insight::Insight,
    recommendation::Recommendation,
    report::Report,
};

use crate::traits::ReportsBackend;

/// What happened to the response of a `fetch_all` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the store contents.
    Applied { sequence: u64, count: usize },
    /// A newer fetch was issued while this one was in flight; its response
    /// (success or failure) was discarded.
    Superseded { sequence: u64, latest: u64 },
}

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    reports: Vec<Report>,
    recommendations: Vec<Recommendation>,
    insights: Vec<Insight>,
    /// Highest fetch sequence number handed out so far.
    issued: u64,
    in_flight: usize,
    last_error: Option<String>,
    revision: u64,
}

impl StoreState {
    /// Flatten recommendations and insights in report order, front to back.
    fn rebuild(&mut self) {
        self.recommendations = self
            .reports
            .iter()
            .flat_map(|r| r.recommendations.iter().cloned())
            .collect();
        self.insights = self
            .reports
            .iter()
            .flat_map(|r| r.insights.iter().cloned())
            .collect();
        self.revision += 1;
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// Session-scoped holder of the user's reports.
///
/// All methods take `&self`; the state sits behind a `Mutex` so the store
/// can be shared by reference across threads.
pub struct ReportStore {
    /// Process-unique; revisions are only comparable within one store.
    id: u64,
    state: Mutex<StoreState>,
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

impl Default for ReportStore {
    fn default() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::default(),
        }
    }
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // The state is plain data and every mutation leaves it consistent,
        // so a poisoned lock is still safe to read.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the whole collection with the backend's current list.
    ///
    /// On failure the previous reports stay in place and the error text is
    /// recorded as `last_error`. A response that lost the race to a newer
    /// fetch is dropped and reported as `FetchOutcome::Superseded`.
    pub fn fetch_all(&self, backend: &dyn ReportsBackend) -> DashResult<FetchOutcome> {
        let sequence = {
            let mut state = self.state();
            state.issued += 1;
            state.in_flight += 1;
            state.issued
        };

        debug!(sequence, "report fetch issued");
        let result = backend.list_reports();

        let mut state = self.state();
        state.in_flight -= 1;

        if sequence != state.issued {
            debug!(
                sequence,
                latest = state.issued,
                "discarding response from superseded report fetch"
            );
            return Ok(FetchOutcome::Superseded {
                sequence,
                latest: state.issued,
            });
        }

        match result {
            Ok(reports) => {
                let count = reports.len();
                state.reports = reports;
                state.last_error = None;
                state.rebuild();
                info!(
                    sequence,
                    count,
                    recommendations = state.recommendations.len(),
                    "reports fetched"
                );
                Ok(FetchOutcome::Applied { sequence, count })
            }
            Err(e) => {
                warn!(sequence, error = %e, "report fetch failed; keeping previous reports");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Insert `report` at the head of the list. No duplicate check: the
    /// caller guarantees the id is new.
    pub fn add(&self, report: Report) {
        let mut state = self.state();
        debug!(report_id = %report.id, "report added");
        state.reports.insert(0, report);
        state.rebuild();
    }

    /// Remove the report with `id`, returning it if it was present.
    pub fn remove(&self, id: &str) -> Option<Report> {
        let mut state = self.state();
        let index = state.reports.iter().position(|r| r.id == id)?;
        let removed = state.reports.remove(index);
        state.rebuild();
        Some(removed)
    }

    /// Drop all reports and any recorded error. In-flight fetches issued
    /// before the reset are superseded.
    pub fn reset(&self) {
        let mut state = self.state();
        state.reports.clear();
        state.last_error = None;
        state.issued += 1;
        state.rebuild();
    }

    pub fn get_by_id(&self, id: &str) -> Option<Report> {
        self.state().reports.iter().find(|r| r.id == id).cloned()
    }

    /// Snapshot of the current reports.
    pub fn reports(&self) -> Vec<Report> {
        self.state().reports.clone()
    }

    /// Run `f` against the current reports without cloning them. `f` also
    /// receives the revision the slice belongs to.
    pub fn with_reports<R>(&self, f: impl FnOnce(u64, &[Report]) -> R) -> R {
        let state = self.state();
        f(state.revision, &state.reports)
    }

    /// All reports' recommendations, flattened in report order.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.state().recommendations.clone()
    }

    /// All reports' insights, flattened in report order.
    pub fn insights(&self) -> Vec<Insight> {
        self.state().insights.clone()
    }

    pub fn len(&self) -> usize {
        self.state().reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().reports.is_empty()
    }

    /// True while at least one fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state().in_flight > 0
    }

    /// User-visible message from the most recent failed operation.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Record a failure from an operation the store did not run itself
    /// (upload, delete) so it surfaces alongside fetch errors.
    pub fn record_error(&self, message: impl Into<String>) {
        self.state().last_error = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Incremented on every change to the report list.
    pub fn revision(&self) -> u64 {
        self.state().revision
    }
}
