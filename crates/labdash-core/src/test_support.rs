//! Fixtures and stub collaborators shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::json;

use labdash_contracts::{
    api::AuthGrant,
    error::{DashError, DashResult},
    report::{Report, ReportDetail},
    user::User,
};

use crate::{
    traits::{AuthBackend, ReportsBackend, TokenStore},
    upload::UploadFile,
};

// ── Report builders ───────────────────────────────────────────────────────────

pub fn report(id: &str, lab: &str, date: &str) -> Report {
    serde_json::from_value(json!({
        "id": id,
        "user_id": "u-1",
        "status": "completed",
        "report_info": {
            "report_id": format!("LAB-{}", id),
            "report_type": "Blood Test",
            "report_date": date,
            "lab_name": lab,
        }
    }))
    .unwrap()
}

pub fn with_recommendations(mut r: Report, ids: &[&str]) -> Report {
    r.recommendations = ids
        .iter()
        .map(|id| {
            serde_json::from_value(json!({
                "id": id,
                "report_id": r.id,
                "title": format!("Recommendation {}", id),
            }))
            .unwrap()
        })
        .collect();
    r
}

pub fn with_insight(mut r: Report, id: &str) -> Report {
    r.insights.push(
        serde_json::from_value(json!({
            "id": id,
            "report_id": r.id,
            "title": "Low iron stores",
            "severity": "moderate",
        }))
        .unwrap(),
    );
    r
}

/// Add a test section parameter. `abnormal` is `Some(("high"|"low", severity))`.
pub fn with_parameter(
    mut r: Report,
    name: &str,
    value: f64,
    range: &str,
    abnormal: Option<(&str, &str)>,
) -> Report {
    let mut p = json!({
        "name": name,
        "value": value,
        "unit": "u",
        "reference_range": range,
        "is_abnormal": abnormal.is_some(),
    });
    if let Some((direction, severity)) = abnormal {
        p["direction"] = json!(direction);
        p["severity"] = json!(severity);
        r.abnormal_parameters.push(
            serde_json::from_value(json!({
                "name": name,
                "value": value,
                "unit": "u",
                "reference_range": range,
                "is_abnormal": true,
                "direction": direction,
                "severity": severity,
                "section": "General",
            }))
            .unwrap(),
        );
    }
    match r.test_sections.first_mut() {
        Some(section) => section.parameters.push(serde_json::from_value(p).unwrap()),
        None => r.test_sections.push(
            serde_json::from_value(json!({
                "section_id": "s-1",
                "section_name": "General",
                "parameters": [p],
            }))
            .unwrap(),
        ),
    }
    r
}

pub fn user(id: &str, name: &str) -> User {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.org", id),
    }))
    .unwrap()
}

// ── Stub collaborators ────────────────────────────────────────────────────────

/// Reports backend that replays a fixed script of `list_reports` results.
pub struct ScriptedReports {
    lists: Mutex<VecDeque<DashResult<Vec<Report>>>>,
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
}

impl ScriptedReports {
    pub fn new(lists: Vec<DashResult<Vec<Report>>>) -> Self {
        Self {
            lists: Mutex::new(lists.into()),
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }
}

impl ReportsBackend for ScriptedReports {
    fn list_reports(&self) -> DashResult<Vec<Report>> {
        self.lists
            .lock()
            .unwrap()
            .pop_front()
            .expect("list_reports called more times than scripted")
    }

    fn get_report(&self, id: &str) -> DashResult<ReportDetail> {
        ReportDetail::try_from(with_insight(report(id, "Quest", "2024-01-01"), "ins-1"))
    }

    fn upload_report(&self, file: &UploadFile) -> DashResult<Report> {
        self.uploads.lock().unwrap().push(file.file_name.clone());
        Ok(report(&format!("up-{}", file.file_name), "Uploaded Lab", "2024-07-01"))
    }

    fn delete_report(&self, id: &str) -> DashResult<()> {
        self.deletes.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// Auth backend with one known account and one known token.
pub struct StubAuth {
    pub email: String,
    pub password: String,
    pub token: String,
    pub user: User,
}

impl StubAuth {
    pub fn new() -> Self {
        Self {
            email: "dana@example.org".to_string(),
            password: "correct horse".to_string(),
            token: "tok-valid".to_string(),
            user: user("u-1", "dana reyes"),
        }
    }
}

impl AuthBackend for StubAuth {
    fn login(&self, email: &str, password: &str) -> DashResult<AuthGrant> {
        if email == self.email && password == self.password {
            Ok(AuthGrant::new(self.token.clone(), self.user.clone()))
        } else {
            Err(DashError::auth("Incorrect email or password"))
        }
    }

    fn signup(&self, name: &str, email: &str, _password: &str) -> DashResult<AuthGrant> {
        if email == self.email {
            return Err(DashError::auth("email already registered"));
        }
        let mut created = user("u-new", name);
        created.email = email.to_string();
        Ok(AuthGrant::new("tok-new", created))
    }

    fn current_user(&self, token: &str) -> DashResult<User> {
        if token == self.token {
            Ok(self.user.clone())
        } else {
            Err(DashError::auth("token expired"))
        }
    }
}

#[derive(Default)]
pub struct MemoryTokens {
    token: Mutex<Option<String>>,
}

impl MemoryTokens {
    pub fn holding(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    pub fn peek(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl TokenStore for MemoryTokens {
    fn load(&self) -> DashResult<Option<String>> {
        Ok(self.peek())
    }

    fn save(&self, token: &str) -> DashResult<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> DashResult<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
