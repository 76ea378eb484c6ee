//! Dashboard walkthroughs against the reference backend.
//!
//! Each scenario wires a real `Dashboard` to an `InMemoryBackend` seeded
//! with mock data and prints what a user of the dashboard would see.

pub mod report_history;
pub mod session_restore;
pub mod upload_validation;
