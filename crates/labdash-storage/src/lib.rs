//! # labdash-storage
//!
//! Persistence of the session token for the LABDASH dashboard.
//!
//! The token lives under the well-known key `auth_token` in a small
//! key-value store. Two implementations of `TokenStore` are provided:
//!
//! - `MemoryTokenStore`: process-local, for tests and scenarios
//! - `FileTokenStore`: a JSON file under the platform data directory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labdash_storage::FileTokenStore;
//! use labdash_core::traits::TokenStore;
//!
//! let tokens = FileTokenStore::at_default_location()?;
//! tokens.save("eyJhbGciOi...")?;
//! assert!(tokens.load()?.is_some());
//! ```

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
