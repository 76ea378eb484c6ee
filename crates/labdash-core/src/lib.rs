//! # labdash-core
//!
//! Client-side state for the LABDASH lab-report dashboard.
//!
//! This crate provides:
//! - The backend seams (`ReportsBackend`, `AuthBackend`, `TokenStore`)
//! - `ReportStore`, the session-scoped report collection with its flattened
//!   recommendations and insights
//! - The filter/sort view over the store, memoized by `ReportView`
//! - `SessionStore`, the login/restore/logout state machine
//! - Upload validation and history trends
//! - `Dashboard`, which wires all of the above together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labdash_core::{Dashboard, ReportQuery, ReportView};
//!
//! let dash = Dashboard::new(reports_api, auth_api, tokens);
//! dash.init()?;
//! let mut view = ReportView::new();
//! let visible = view.query(dash.store(), &ReportQuery::search("quest"));
//! ```

pub mod dashboard;
pub mod history;
pub mod session;
pub mod store;
pub mod traits;
pub mod upload;
pub mod view;

#[cfg(test)]
mod test_support;

pub use dashboard::Dashboard;
pub use session::{SessionState, SessionStore};
pub use store::{FetchOutcome, ReportStore};
pub use upload::{FileKind, UploadFile};
pub use view::{ReportQuery, ReportView, SortDirection, SortKey};
