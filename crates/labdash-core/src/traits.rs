//! Trait definitions for the collaborators the stores depend on.
//!
//! These three traits are the whole boundary between dashboard state and
//! the outside world:
//!
//! - `ReportsBackend`: report CRUD against the REST backend
//! - `AuthBackend`: login, signup, and token verification
//! - `TokenStore`: persistence of the session token across restarts
//!
//! Stores receive implementations by reference and never construct them,
//! so tests and the reference backend can stand in for the HTTP client.

use labdash_contracts::{
    api::AuthGrant,
    error::DashResult,
    report::{Report, ReportDetail},
    user::User,
};

use crate::upload::UploadFile;

/// Well-known storage key under which the session token is persisted.
pub const TOKEN_KEY: &str = "auth_token";

/// Report endpoints of the backend.
///
/// Every method is a single request with no retry. Network and decode
/// failures surface as `DashError::Fetch`.
pub trait ReportsBackend: Send + Sync {
    /// `GET /reports`
    fn list_reports(&self) -> DashResult<Vec<Report>>;

    /// `GET /reports/{id}`
    fn get_report(&self, id: &str) -> DashResult<ReportDetail>;

    /// `POST /reports/upload`. The file has already passed validation.
    fn upload_report(&self, file: &UploadFile) -> DashResult<Report>;

    /// `DELETE /reports/{id}`
    fn delete_report(&self, id: &str) -> DashResult<()>;
}

/// Authentication endpoints of the backend.
///
/// Rejected credentials and expired tokens surface as `DashError::Auth`.
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/login`
    fn login(&self, email: &str, password: &str) -> DashResult<AuthGrant>;

    /// `POST /auth/signup`
    fn signup(&self, name: &str, email: &str, password: &str) -> DashResult<AuthGrant>;

    /// `GET /auth/me`, authenticated with `token`.
    fn current_user(&self, token: &str) -> DashResult<User>;
}

/// Persistence for the single session token.
pub trait TokenStore: Send + Sync {
    /// Return the persisted token, if any.
    fn load(&self) -> DashResult<Option<String>>;

    /// Persist `token`, replacing any previous one.
    fn save(&self, token: &str) -> DashResult<()>;

    /// Remove the persisted token. Clearing an empty store is not an error.
    fn clear(&self) -> DashResult<()>;
}
