//! # labdash-ref
//!
//! Reference runtime for the LABDASH dashboard.
//!
//! Provides `InMemoryBackend`, an in-process implementation of both backend
//! traits, and three scenarios that drive a real `Dashboard` against it:
//!
//! 1. **Report History**: list ordering, search, aggregated
//!    recommendations, parameter trends, failed refresh.
//! 2. **Session Restore**: token persistence, silent restore, revoked
//!    tokens, rejected credentials.
//! 3. **Upload Validation**: type and size checks before upload, prepend
//!    on success, delete.
//!
//! All data is hardcoded and fictional. No external API calls are made.

pub mod backend;
pub mod mock_data;
pub mod scenarios;

pub use backend::InMemoryBackend;
