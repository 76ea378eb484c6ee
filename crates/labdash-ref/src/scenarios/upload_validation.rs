//! Scenario 3: Upload Validation
//!
//! Offers the dashboard a series of files. Valid ones are uploaded and
//! appear at the head of the report list; invalid ones are rejected locally
//! and never reach the backend. The accepted upload is then deleted again.

use std::sync::Arc;

use labdash_contracts::error::DashResult;
use labdash_core::{Dashboard, UploadFile};
use labdash_storage::MemoryTokenStore;

use crate::{
    backend::InMemoryBackend,
    mock_data::{DEMO_EMAIL, DEMO_PASSWORD},
};

const MB: usize = 1024 * 1024;

/// One offered file and what happened to it.
#[derive(Debug)]
pub struct Attempt {
    pub file_name: String,
    pub size: usize,
    /// `Ok(report id)` or `Err(message)`.
    pub outcome: Result<String, String>,
}

#[derive(Debug)]
pub struct UploadWalkthrough {
    pub attempts: Vec<Attempt>,
    pub head_after_uploads: Option<String>,
    pub backend_count_after_uploads: usize,
    pub count_after_delete: usize,
}

fn candidates() -> Vec<UploadFile> {
    vec![
        UploadFile::new("cbc_2024_06.pdf", None, vec![0x25; 2 * MB]),
        UploadFile::new("whole_year_scan.pdf", None, vec![0x25; 15 * MB]),
        UploadFile::new("notes.txt", None, vec![b'n'; 2048]),
        UploadFile::new("photo", Some("image/jpeg".to_string()), vec![0xFF; 300 * 1024]),
    ]
}

pub fn walk_uploads() -> DashResult<UploadWalkthrough> {
    let backend = Arc::new(InMemoryBackend::seeded()?);
    let dash = Dashboard::new(backend.clone(), backend.clone(), Arc::new(MemoryTokenStore::new()));
    dash.login(DEMO_EMAIL, DEMO_PASSWORD)?;

    let attempts: Vec<Attempt> = candidates()
        .into_iter()
        .map(|file| Attempt {
            size: file.content.len(),
            outcome: dash.upload(&file).map(|r| r.id).map_err(|e| e.to_string()),
            file_name: file.file_name,
        })
        .collect();

    let head_after_uploads = dash.store().reports().first().map(|r| r.id.clone());
    let backend_count_after_uploads = backend.report_count()?;

    if let Some(Ok(id)) = attempts.first().map(|a| &a.outcome) {
        dash.delete_report(id)?;
    }

    Ok(UploadWalkthrough {
        attempts,
        head_after_uploads,
        backend_count_after_uploads,
        count_after_delete: dash.store().len(),
    })
}

/// Run Scenario 3: Upload Validation.
pub fn run_scenario() -> DashResult<()> {
    println!("=== Scenario 3: Upload Validation ===");
    println!();

    let walk = walk_uploads()?;

    for attempt in &walk.attempts {
        let size_kb = attempt.size / 1024;
        match &attempt.outcome {
            Ok(id) => println!("  {:<22} {:>6} KB  ACCEPTED as {}", attempt.file_name, size_kb, id),
            Err(reason) => println!("  {:<22} {:>6} KB  REJECTED: {}", attempt.file_name, size_kb, reason),
        }
    }
    println!(
        "  Head of report list:       {}",
        walk.head_after_uploads.as_deref().unwrap_or("(empty)")
    );
    println!("  Reports on backend:        {}", walk.backend_count_after_uploads);
    println!("  Reports after delete:      {}", walk.count_after_delete);
    println!("  RESULT: SUCCESS");
    println!();
    Ok(())
}
