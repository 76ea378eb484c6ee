//! # labdash-contracts
//!
//! Shared types, wire envelopes, and errors for the LABDASH report dashboard.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, their decoding rules, and error types.

pub mod api;
pub mod error;
pub mod insight;
pub mod parameter;
pub mod recommendation;
pub mod report;
pub mod time;
pub mod user;

#[cfg(test)]
mod tests {
    use super::*;
    use error::DashError;

    // ── DashError display messages ───────────────────────────────────────────

    #[test]
    fn error_fetch_display() {
        let msg = DashError::fetch("connection refused").to_string();
        assert!(msg.contains("fetch failed"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn error_auth_display() {
        let msg = DashError::auth("Incorrect email or password").to_string();
        assert!(msg.contains("authentication failed"));
        assert!(msg.contains("Incorrect email or password"));
    }

    #[test]
    fn error_validation_display() {
        let msg = DashError::validation("file too large").to_string();
        assert!(msg.contains("validation failed"));
        assert!(msg.contains("file too large"));
    }

    #[test]
    fn error_not_found_display() {
        let err = DashError::NotFound {
            what: "report r-404".to_string(),
        };
        assert_eq!(err.to_string(), "not found: report r-404");
    }

    #[test]
    fn error_storage_and_config_display() {
        let storage = DashError::Storage {
            reason: "disk full".to_string(),
        };
        let config = DashError::Config {
            reason: "missing base_url".to_string(),
        };
        assert!(storage.to_string().contains("storage error"));
        assert!(config.to_string().contains("configuration error"));
    }
}
