//! In-process stand-in for the REST backend.
//!
//! `InMemoryBackend` implements both backend traits over mutable in-memory
//! state: a report list, an account table, and the tokens it has issued.
//! It keeps the backend's observable contract (detail views always carry an
//! insight, uploads are validated, unknown ids are `NotFound`, bad
//! credentials are `Auth`) without any network.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use labdash_contracts::{
    api::{decode, AuthGrant},
    error::{DashError, DashResult},
    report::{Report, ReportDetail},
    user::User,
};
use labdash_core::{
    traits::{AuthBackend, ReportsBackend},
    upload::UploadFile,
};

use crate::mock_data::{demo_user, mock_reports, uploaded_report_json, DEMO_PASSWORD};

struct Account {
    password: String,
    user: User,
}

#[derive(Default)]
struct BackendState {
    reports: Vec<Report>,
    accounts: Vec<Account>,
    /// Issued token → user id.
    sessions: HashMap<String, String>,
    /// When set, the next `list_reports` fails with this reason.
    fail_next_list: Option<String>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    /// An empty backend: no reports, no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding the mock reports and the demo account.
    pub fn seeded() -> DashResult<Self> {
        let backend = Self::new();
        {
            let mut state = backend.state()?;
            state.reports = mock_reports()?;
            state.accounts.push(Account {
                password: DEMO_PASSWORD.to_string(),
                user: demo_user()?,
            });
        }
        Ok(backend)
    }

    fn state(&self) -> DashResult<MutexGuard<'_, BackendState>> {
        self.state.lock().map_err(|e| DashError::Fetch {
            reason: format!("reference backend lock poisoned: {}", e),
        })
    }

    /// Make the next `list_reports` call fail with `reason`.
    pub fn fail_next_list(&self, reason: impl Into<String>) -> DashResult<()> {
        self.state()?.fail_next_list = Some(reason.into());
        Ok(())
    }

    /// Invalidate every issued token, as a server-side session expiry would.
    pub fn revoke_all_sessions(&self) -> DashResult<()> {
        let mut state = self.state()?;
        let revoked = state.sessions.len();
        state.sessions.clear();
        info!(revoked, "reference backend revoked all sessions");
        Ok(())
    }

    pub fn report_count(&self) -> DashResult<usize> {
        Ok(self.state()?.reports.len())
    }

    fn grant(state: &mut BackendState, user: User) -> AuthGrant {
        let token = format!("ref-{}", Uuid::new_v4());
        state.sessions.insert(token.clone(), user.id.clone());
        AuthGrant::new(token, user)
    }
}

impl ReportsBackend for InMemoryBackend {
    fn list_reports(&self) -> DashResult<Vec<Report>> {
        let mut state = self.state()?;
        if let Some(reason) = state.fail_next_list.take() {
            return Err(DashError::fetch(reason));
        }
        Ok(state.reports.clone())
    }

    fn get_report(&self, id: &str) -> DashResult<ReportDetail> {
        let state = self.state()?;
        let report = state
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DashError::NotFound {
                what: format!("report '{}'", id),
            })?;
        ReportDetail::try_from(report)
    }

    fn upload_report(&self, file: &UploadFile) -> DashResult<Report> {
        let kind = file.validate()?;
        let id = format!("rep-{}", Uuid::new_v4().simple());
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mime = file.mime_type.as_deref().unwrap_or(kind.mime());
        let report: Report = decode(
            "uploaded report",
            uploaded_report_json(&id, &file.file_name, mime, file.size(), &today),
        )?;

        self.state()?.reports.insert(0, report.clone());
        debug!(report_id = %id, file_name = %file.file_name, "reference backend stored upload");
        Ok(report)
    }

    fn delete_report(&self, id: &str) -> DashResult<()> {
        let mut state = self.state()?;
        let index = state
            .reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DashError::NotFound {
                what: format!("report '{}'", id),
            })?;
        state.reports.remove(index);
        Ok(())
    }
}

impl AuthBackend for InMemoryBackend {
    fn login(&self, email: &str, password: &str) -> DashResult<AuthGrant> {
        let mut state = self.state()?;
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| DashError::auth("Incorrect email or password"))?;
        Ok(Self::grant(&mut state, user))
    }

    fn signup(&self, name: &str, email: &str, password: &str) -> DashResult<AuthGrant> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(DashError::validation("name, email and password are required"));
        }
        let mut state = self.state()?;
        if state.accounts.iter().any(|a| a.user.email.eq_ignore_ascii_case(email)) {
            return Err(DashError::auth("Email already registered"));
        }

        let user: User = decode(
            "new user",
            serde_json::json!({
                "id": format!("user-{}", Uuid::new_v4().simple()),
                "name": name.trim(),
                "email": email.trim(),
                "created_at": Utc::now().to_rfc3339(),
            }),
        )?;
        state.accounts.push(Account {
            password: password.to_string(),
            user: user.clone(),
        });
        Ok(Self::grant(&mut state, user))
    }

    fn current_user(&self, token: &str) -> DashResult<User> {
        let state = self.state()?;
        let user_id = state
            .sessions
            .get(token)
            .ok_or_else(|| DashError::auth("Could not validate credentials"))?;
        state
            .accounts
            .iter()
            .find(|a| &a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| DashError::auth("Could not validate credentials"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::DEMO_EMAIL;

    /// Seeded backend serves the three mock reports in wire order.
    #[test]
    fn test_seeded_reports() {
        let backend = InMemoryBackend::seeded().unwrap();
        let ids: Vec<String> = backend.list_reports().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["rep-001", "rep-002", "rep-003"]);
    }

    /// Every seeded report is a valid detail view.
    #[test]
    fn test_every_report_has_detail() {
        let backend = InMemoryBackend::seeded().unwrap();
        for id in ["rep-001", "rep-002", "rep-003"] {
            assert!(!backend.get_report(id).unwrap().insights().is_empty());
        }
        assert!(matches!(
            backend.get_report("rep-404"),
            Err(DashError::NotFound { .. })
        ));
    }

    /// Issued tokens resolve until revoked.
    #[test]
    fn test_token_lifecycle() {
        let backend = InMemoryBackend::seeded().unwrap();
        let grant = backend.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();

        assert_eq!(backend.current_user(&grant.access_token).unwrap().name, "Avery Stone");

        backend.revoke_all_sessions().unwrap();
        assert!(matches!(
            backend.current_user(&grant.access_token),
            Err(DashError::Auth { .. })
        ));
    }

    /// Signup rejects duplicate emails and issues a working token otherwise.
    #[test]
    fn test_signup() {
        let backend = InMemoryBackend::seeded().unwrap();
        assert!(backend.signup("Avery", DEMO_EMAIL, "pw").is_err());

        let grant = backend.signup("Rui Costa", "rui@example.org", "pw-1234").unwrap();
        assert_eq!(backend.current_user(&grant.access_token).unwrap().email, "rui@example.org");
        assert!(backend.login("rui@example.org", "pw-1234").is_ok());
    }

    /// Uploads are validated, stored first, and removable.
    #[test]
    fn test_upload_and_delete() {
        let backend = InMemoryBackend::seeded().unwrap();
        let file = UploadFile::new("panel.png", None, vec![7u8; 512]);

        let created = backend.upload_report(&file).unwrap();
        assert_eq!(backend.list_reports().unwrap()[0].id, created.id);
        assert_eq!(created.file.as_ref().unwrap().mime_type, "image/png");

        backend.delete_report(&created.id).unwrap();
        assert_eq!(backend.report_count().unwrap(), 3);
        assert!(backend.delete_report(&created.id).is_err());
    }

    /// A scripted failure affects exactly one list call.
    #[test]
    fn test_fail_next_list() {
        let backend = InMemoryBackend::seeded().unwrap();
        backend.fail_next_list("HTTP 503").unwrap();
        assert!(backend.list_reports().is_err());
        assert!(backend.list_reports().is_ok());
    }
}
