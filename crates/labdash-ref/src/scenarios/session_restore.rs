//! Scenario 2: Session Restore
//!
//! Three dashboard instances share one token store, standing in for three
//! launches of the app:
//!
//! 1. signs in, which persists the token
//! 2. starts up and restores the session silently
//! 3. starts up after the server revoked all sessions; the stale token is
//!    cleared and the app starts signed out, without an error
//!
//! A sign-in with a wrong password shows the `Auth` failure path.

use std::sync::Arc;

use labdash_contracts::error::{DashError, DashResult};
use labdash_core::{traits::TokenStore, Dashboard};
use labdash_storage::MemoryTokenStore;

use crate::{
    backend::InMemoryBackend,
    mock_data::{DEMO_EMAIL, DEMO_PASSWORD},
};

#[derive(Debug)]
pub struct SessionWalkthrough {
    pub initials: String,
    pub restored: bool,
    pub reports_after_restore: usize,
    pub restored_after_revoke: bool,
    pub token_after_revoke: Option<String>,
    pub wrong_password: DashError,
}

pub fn walk_session() -> DashResult<SessionWalkthrough> {
    let backend = Arc::new(InMemoryBackend::seeded()?);
    let tokens = MemoryTokenStore::new();
    let launch = || Dashboard::new(backend.clone(), backend.clone(), Arc::new(tokens.clone()));

    let first = launch();
    let user = first.login(DEMO_EMAIL, DEMO_PASSWORD)?;

    let second = launch();
    let restored = second.init()?;
    let reports_after_restore = second.store().len();

    backend.revoke_all_sessions()?;
    let third = launch();
    let restored_after_revoke = third.init()?;

    let wrong_password = match third.login(DEMO_EMAIL, "not-the-password") {
        Err(e) => e,
        Ok(_) => DashError::auth("wrong password was accepted"),
    };

    Ok(SessionWalkthrough {
        initials: user.initials,
        restored,
        reports_after_restore,
        restored_after_revoke,
        token_after_revoke: tokens.load()?,
        wrong_password,
    })
}

/// Run Scenario 2: Session Restore.
pub fn run_scenario() -> DashResult<()> {
    println!("=== Scenario 2: Session Restore ===");
    println!();

    let walk = walk_session()?;

    println!("  Launch 1: signed in as {}", walk.initials);
    println!(
        "  Launch 2: session restored = {} ({} report(s) loaded)",
        walk.restored, walk.reports_after_restore
    );
    println!(
        "  Launch 3: session restored = {} after server revoke; persisted token {}",
        walk.restored_after_revoke,
        if walk.token_after_revoke.is_some() { "KEPT" } else { "CLEARED" }
    );
    println!("  Wrong password:            {}", walk.wrong_password);
    println!("  RESULT: SUCCESS");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Token persisted by one launch restores the next.
    #[test]
    fn test_restore_from_persisted_token() {
        let walk = walk_session().unwrap();
        assert_eq!(walk.initials, "AS");
        assert!(walk.restored);
        assert_eq!(walk.reports_after_restore, 3);
    }

    /// A revoked token is cleared silently.
    #[test]
    fn test_revoked_token_cleared() {
        let walk = walk_session().unwrap();
        assert!(!walk.restored_after_revoke);
        assert!(walk.token_after_revoke.is_none());
    }

    /// Wrong password surfaces as an authentication error.
    #[test]
    fn test_wrong_password_is_auth_error() {
        let walk = walk_session().unwrap();
        assert_eq!(walk.wrong_password, DashError::auth("Incorrect email or password"));
    }
}
