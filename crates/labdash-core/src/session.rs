//! The user session state machine.
//!
//! ```text
//!   Anonymous ──login/register──▶ Authenticating ──ok──▶ Authenticated
//!       ▲                               │                      │
//!       └──────────── failure ──────────┘                      │
//!       └──────────────────────── logout ──────────────────────┘
//! ```
//!
//! A successful login or registration persists the session token through
//! the `TokenStore`; `restore` uses that token to re-authenticate silently
//! on startup. Profile and settings edits are local merges only.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use labdash_contracts::{
    api::AuthGrant,
    error::{DashError, DashResult},
    user::{initials, ProfilePatch, SettingsPatch, User},
};

use crate::traits::{AuthBackend, TokenStore};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(User),
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    last_error: Option<String>,
}

/// Holder of the authenticated user, if any.
pub struct SessionStore {
    inner: Mutex<SessionInner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// A new store starts anonymous. Call `restore` to pick up a persisted
    /// session.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Anonymous,
                last_error: None,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `Authenticating`, refusing if a sign-in is already running.
    fn begin(&self) -> DashResult<()> {
        let mut inner = self.inner();
        if inner.state == SessionState::Authenticating {
            return Err(DashError::auth("authentication already in progress"));
        }
        inner.state = SessionState::Authenticating;
        inner.last_error = None;
        Ok(())
    }

    /// Apply the backend's answer to a login or registration attempt.
    fn finish(
        &self,
        tokens: &dyn TokenStore,
        result: DashResult<AuthGrant>,
    ) -> DashResult<User> {
        match result {
            Ok(grant) => {
                if let Err(e) = tokens.save(&grant.access_token) {
                    // Session stays usable for this process only.
                    warn!(error = %e, "failed to persist session token");
                }
                let mut user = grant.user;
                user.initials = initials(&user.name);
                info!(user_id = %user.id, "session authenticated");
                self.inner().state = SessionState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                let mut inner = self.inner();
                inner.state = SessionState::Anonymous;
                inner.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Returns `DashError::Auth` when the credentials are rejected; the
    /// session is then `Anonymous` with the message kept in `last_error`.
    pub fn login(
        &self,
        auth: &dyn AuthBackend,
        tokens: &dyn TokenStore,
        email: &str,
        password: &str,
    ) -> DashResult<User> {
        self.begin()?;
        debug!(email, "logging in");
        let result = auth.login(email, password);
        self.finish(tokens, result)
    }

    /// Create an account, then sign in as it.
    pub fn register(
        &self,
        auth: &dyn AuthBackend,
        tokens: &dyn TokenStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> DashResult<User> {
        self.begin()?;
        debug!(email, "registering account");
        let result = auth.signup(name, email, password);
        self.finish(tokens, result)
    }

    /// Re-authenticate from a persisted token, if one exists.
    ///
    /// Never fails: a missing token leaves the session anonymous, and a
    /// rejected token is cleared and likewise leaves it anonymous, without
    /// recording an error. Returns whether the session is now authenticated.
    /// An already authenticated session is left untouched.
    pub fn restore(&self, auth: &dyn AuthBackend, tokens: &dyn TokenStore) -> bool {
        if self.is_authenticated() {
            debug!("session already authenticated; skipping restore");
            return true;
        }

        let token = match tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no persisted session token");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "could not read persisted session token");
                return false;
            }
        };

        if self.begin().is_err() {
            return false;
        }

        match auth.current_user(&token) {
            Ok(mut user) => {
                user.initials = initials(&user.name);
                info!(user_id = %user.id, "session restored from persisted token");
                self.inner().state = SessionState::Authenticated(user);
                true
            }
            Err(e) => {
                warn!(error = %e, "persisted session token rejected; clearing it");
                if let Err(e) = tokens.clear() {
                    warn!(error = %e, "failed to clear rejected session token");
                }
                self.inner().state = SessionState::Anonymous;
                false
            }
        }
    }

    /// End the session and forget the persisted token.
    pub fn logout(&self, tokens: &dyn TokenStore) {
        {
            let mut inner = self.inner();
            inner.state = SessionState::Anonymous;
            inner.last_error = None;
        }
        if let Err(e) = tokens.clear() {
            warn!(error = %e, "failed to clear session token on logout");
        }
        info!("session ended");
    }

    /// Run `f` on the authenticated user and stamp `updated_at`.
    fn modify(&self, f: impl FnOnce(&mut User)) -> DashResult<User> {
        let mut inner = self.inner();
        match &mut inner.state {
            SessionState::Authenticated(user) => {
                f(user);
                user.updated_at = Some(Utc::now());
                Ok(user.clone())
            }
            _ => Err(DashError::NotAuthenticated),
        }
    }

    /// Merge `patch` into the user's profile.
    pub fn update_profile(&self, patch: ProfilePatch) -> DashResult<User> {
        self.modify(|user| patch.apply(&mut user.profile))
    }

    /// Merge `patch` into the user's settings.
    pub fn update_settings(&self, patch: SettingsPatch) -> DashResult<User> {
        self.modify(|user| patch.apply(&mut user.settings))
    }

    /// Replace the whole user record, e.g. after the backend returned a
    /// fresh copy.
    pub fn replace_user(&self, user: User) -> DashResult<User> {
        let mut inner = self.inner();
        match inner.state {
            SessionState::Authenticated(_) => {
                let mut user = user;
                user.initials = initials(&user.name);
                inner.state = SessionState::Authenticated(user.clone());
                Ok(user)
            }
            _ => Err(DashError::NotAuthenticated),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner().state.clone()
    }

    pub fn user(&self) -> Option<User> {
        match &self.inner().state {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.inner().state, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        self.inner().state == SessionState::Authenticating
    }

    /// Message from the last failed login or registration.
    pub fn last_error(&self) -> Option<String> {
        self.inner().last_error.clone()
    }
}
