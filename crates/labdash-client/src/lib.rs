//! # labdash-client
//!
//! The production backend for the LABDASH dashboard: a blocking REST client
//! implementing `ReportsBackend` and `AuthBackend`, plus its TOML
//! configuration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use labdash_client::{ClientConfig, HttpBackend};
//!
//! let config = ClientConfig::load(None)?;
//! let backend = Arc::new(HttpBackend::new(&config, tokens.clone())?);
//! let dash = Dashboard::new(backend.clone(), backend, tokens);
//! ```

pub mod config;
pub mod http;

pub use config::{ClientConfig, API_URL_ENV, DEFAULT_BASE_URL};
pub use http::HttpBackend;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use labdash_contracts::error::DashError;

    use super::ClientConfig;
    use crate::config::DEFAULT_TIMEOUT_SECS;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn parses_all_keys_and_trims_trailing_slash() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://labs.example.org/api/v1/"
            timeout_secs = 5
            token_path = "/tmp/labdash-test/storage.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://labs.example.org/api/v1");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.token_path.unwrap().ends_with("storage.json"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        for doc in [
            "base_uri = \"http://x\"",
            "base_url = \"ftp://x\"",
            "timeout_secs = 0",
            "timeout_secs = \"soon\"",
        ] {
            let err = ClientConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, DashError::Config { .. }), "accepted: {}", doc);
        }
    }

    #[test]
    fn base_url_override_ignores_blank_values() {
        let config = ClientConfig::default()
            .with_base_url_override(Some("   ".to_string()))
            .with_base_url_override(None);
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");

        let config = config.with_base_url_override(Some("https://api.example.org".to_string()));
        assert_eq!(config.base_url, "https://api.example.org");
    }

    #[test]
    fn from_file_reads_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labdash.toml");
        fs::write(&path, "timeout_secs = 12\n").unwrap();

        assert_eq!(ClientConfig::from_file(&path).unwrap().timeout_secs, 12);

        let err = ClientConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, DashError::Config { ref reason } if reason.contains("missing.toml")));
    }
}
