//! The dashboard: one explicit container wiring the backends to the two
//! session-scoped stores.
//!
//! Operations that talk to the reports backend require an authenticated
//! session. Their failures are returned to the caller and also recorded on
//! the report store, so a UI can render `store().last_error()` without
//! threading results through. An `Auth` failure from any of them means the
//! token is no longer accepted: the session is ended and the persisted token
//! removed before the error is recorded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use labdash_contracts::{
    error::{DashError, DashResult},
    report::{Report, ReportDetail},
    user::User,
};

use crate::{
    session::SessionStore,
    store::{FetchOutcome, ReportStore},
    traits::{AuthBackend, ReportsBackend, TokenStore},
    upload::UploadFile,
};

pub struct Dashboard {
    reports_api: Arc<dyn ReportsBackend>,
    auth_api: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    store: ReportStore,
    session: SessionStore,
}

impl Dashboard {
    pub fn new(
        reports_api: Arc<dyn ReportsBackend>,
        auth_api: Arc<dyn AuthBackend>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            reports_api,
            auth_api,
            tokens,
            store: ReportStore::new(),
            session: SessionStore::new(),
        }
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Startup: restore a persisted session and, if that succeeds, load the
    /// user's reports. Returns whether a session was restored.
    pub fn init(&self) -> DashResult<bool> {
        if !self.session.restore(self.auth_api.as_ref(), self.tokens.as_ref()) {
            debug!("starting without a session");
            return Ok(false);
        }
        self.recorded(|| self.store.fetch_all(self.reports_api.as_ref()))?;
        Ok(true)
    }

    /// Sign in, then load the user's reports.
    ///
    /// A failed report fetch does not undo the sign-in; it is left on the
    /// store as `last_error`.
    pub fn login(&self, email: &str, password: &str) -> DashResult<User> {
        let user = self
            .session
            .login(self.auth_api.as_ref(), self.tokens.as_ref(), email, password)?;
        self.load_after_sign_in();
        Ok(user)
    }

    /// Create an account, sign in as it, then load its (usually empty)
    /// report list.
    pub fn register(&self, name: &str, email: &str, password: &str) -> DashResult<User> {
        let user = self.session.register(
            self.auth_api.as_ref(),
            self.tokens.as_ref(),
            name,
            email,
            password,
        )?;
        self.load_after_sign_in();
        Ok(user)
    }

    fn load_after_sign_in(&self) {
        self.store.reset();
        if let Err(e) = self.store.fetch_all(self.reports_api.as_ref()) {
            warn!(error = %e, "signed in but report fetch failed");
        }
    }

    /// End the session and drop everything loaded for it.
    pub fn logout(&self) {
        self.session.logout(self.tokens.as_ref());
        self.store.reset();
    }

    fn require_session(&self) -> DashResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(DashError::NotAuthenticated)
        }
    }

    /// Run `op`, copying any failure onto the store. A rejected token ends
    /// the session first.
    fn recorded<T>(&self, op: impl FnOnce() -> DashResult<T>) -> DashResult<T> {
        op().inspect_err(|e| {
            if matches!(e, DashError::Auth { .. }) {
                warn!(error = %e, "backend rejected the session token; signing out");
                self.logout();
            }
            self.store.record_error(e.to_string());
        })
    }

    /// Reload the report list from the backend.
    pub fn refresh(&self) -> DashResult<FetchOutcome> {
        self.require_session()?;
        self.recorded(|| self.store.fetch_all(self.reports_api.as_ref()))
    }

    /// Validate `file` locally, upload it, and put the created report at the
    /// head of the store. An invalid file never reaches the backend.
    pub fn upload(&self, file: &UploadFile) -> DashResult<Report> {
        self.require_session()?;
        self.recorded(|| {
            let kind = file.validate()?;
            debug!(file_name = %file.file_name, kind = ?kind, size = file.size(), "uploading report");
            let report = self.reports_api.upload_report(file)?;
            info!(report_id = %report.id, "report uploaded");
            self.store.add(report.clone());
            self.store.clear_error();
            Ok(report)
        })
    }

    /// Delete on the backend, then locally.
    pub fn delete_report(&self, id: &str) -> DashResult<()> {
        self.require_session()?;
        self.recorded(|| {
            self.reports_api.delete_report(id)?;
            if self.store.remove(id).is_none() {
                debug!(report_id = %id, "deleted report was not loaded locally");
            }
            info!(report_id = %id, "report deleted");
            Ok(())
        })
    }

    /// Fetch the full detail view of one report.
    pub fn report_detail(&self, id: &str) -> DashResult<ReportDetail> {
        self.require_session()?;
        self.recorded(|| self.reports_api.get_report(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{report, MemoryTokens, ScriptedReports, StubAuth};

    fn dashboard(
        lists: Vec<DashResult<Vec<Report>>>,
        tokens: MemoryTokens,
    ) -> (Dashboard, Arc<ScriptedReports>, Arc<MemoryTokens>) {
        let reports = Arc::new(ScriptedReports::new(lists));
        let tokens = Arc::new(tokens);
        let dash = Dashboard::new(reports.clone(), Arc::new(StubAuth::new()), tokens.clone());
        (dash, reports, tokens)
    }

    fn sample() -> Vec<Report> {
        vec![
            report("r-1", "Quest", "2024-01-01"),
            report("r-2", "Mayo", "2024-02-01"),
        ]
    }

    // ── startup ───────────────────────────────────────────────────────────────

    #[test]
    fn init_with_persisted_token_loads_reports() {
        let (dash, _, _) = dashboard(vec![Ok(sample())], MemoryTokens::holding("tok-valid"));

        assert!(dash.init().unwrap());
        assert!(dash.session().is_authenticated());
        assert_eq!(dash.store().len(), 2);
    }

    #[test]
    fn init_without_token_does_not_fetch() {
        // An empty script would panic if list_reports were called.
        let (dash, _, _) = dashboard(vec![], MemoryTokens::default());

        assert!(!dash.init().unwrap());
        assert!(dash.store().is_empty());
    }

    // ── sign in / out ─────────────────────────────────────────────────────────

    #[test]
    fn login_fetches_and_logout_clears() {
        let (dash, _, tokens) = dashboard(vec![Ok(sample())], MemoryTokens::default());

        dash.login("dana@example.org", "correct horse").unwrap();
        assert_eq!(dash.store().len(), 2);

        dash.logout();
        assert!(dash.store().is_empty());
        assert!(!dash.session().is_authenticated());
        assert!(tokens.peek().is_none());
    }

    #[test]
    fn login_survives_failed_report_fetch() {
        let (dash, _, _) = dashboard(
            vec![Err(DashError::fetch("HTTP 502"))],
            MemoryTokens::default(),
        );

        let user = dash.login("dana@example.org", "correct horse").unwrap();

        assert_eq!(user.id, "u-1");
        assert!(dash.store().last_error().unwrap().contains("HTTP 502"));
    }

    #[test]
    fn operations_require_a_session() {
        let (dash, _, _) = dashboard(vec![], MemoryTokens::default());

        assert_eq!(dash.refresh().unwrap_err(), DashError::NotAuthenticated);
        assert_eq!(dash.delete_report("r-1").unwrap_err(), DashError::NotAuthenticated);
    }

    #[test]
    fn expired_token_on_refresh_signs_out() {
        let (dash, _, tokens) = dashboard(
            vec![Ok(sample()), Err(DashError::auth("Token has expired"))],
            MemoryTokens::default(),
        );
        dash.login("dana@example.org", "correct horse").unwrap();
        assert_eq!(tokens.peek().as_deref(), Some("tok-valid"));

        let err = dash.refresh().unwrap_err();

        assert_eq!(err, DashError::auth("Token has expired"));
        assert!(!dash.session().is_authenticated());
        assert!(tokens.peek().is_none());
        assert!(dash.store().is_empty());
        assert!(dash.store().last_error().unwrap().contains("Token has expired"));
        assert_eq!(dash.refresh().unwrap_err(), DashError::NotAuthenticated);
    }

    #[test]
    fn fetch_failure_keeps_session() {
        let (dash, _, tokens) = dashboard(
            vec![Ok(sample()), Err(DashError::fetch("HTTP 503"))],
            MemoryTokens::default(),
        );
        dash.login("dana@example.org", "correct horse").unwrap();

        assert!(dash.refresh().is_err());
        assert!(dash.session().is_authenticated());
        assert!(tokens.peek().is_some());
        assert_eq!(dash.store().len(), 2);
    }

    // ── upload / delete ───────────────────────────────────────────────────────

    #[test]
    fn upload_prepends_created_report() {
        let (dash, backend, _) = dashboard(vec![Ok(sample())], MemoryTokens::default());
        dash.login("dana@example.org", "correct horse").unwrap();

        let file = UploadFile::new("cbc.pdf", None, vec![1u8; 2048]);
        let created = dash.upload(&file).unwrap();

        assert_eq!(created.id, "up-cbc.pdf");
        assert_eq!(dash.store().reports()[0].id, "up-cbc.pdf");
        assert_eq!(*backend.uploads.lock().unwrap(), vec!["cbc.pdf".to_string()]);
    }

    #[test]
    fn invalid_upload_never_reaches_backend() {
        let (dash, backend, _) = dashboard(vec![Ok(sample())], MemoryTokens::default());
        dash.login("dana@example.org", "correct horse").unwrap();

        let err = dash
            .upload(&UploadFile::new("notes.txt", None, vec![1u8; 10]))
            .unwrap_err();

        assert!(matches!(err, DashError::Validation { .. }));
        assert!(backend.uploads.lock().unwrap().is_empty());
        assert_eq!(dash.store().len(), 2);
        assert!(dash.store().last_error().is_some());
    }

    #[test]
    fn delete_removes_locally_after_backend() {
        let (dash, backend, _) = dashboard(vec![Ok(sample())], MemoryTokens::default());
        dash.login("dana@example.org", "correct horse").unwrap();

        dash.delete_report("r-1").unwrap();

        assert!(dash.store().get_by_id("r-1").is_none());
        assert_eq!(*backend.deletes.lock().unwrap(), vec!["r-1".to_string()]);
    }

    #[test]
    fn report_detail_carries_insights() {
        let (dash, _, _) = dashboard(vec![Ok(sample())], MemoryTokens::default());
        dash.login("dana@example.org", "correct horse").unwrap();

        let detail = dash.report_detail("r-2").unwrap();
        assert_eq!(detail.report().id, "r-2");
        assert!(!detail.insights().is_empty());
    }
}
