//! Scenario 1: Report History
//!
//! Signs in to the seeded reference backend and walks the read side of the
//! dashboard:
//!
//! - the report list, newest first and filtered by lab
//! - recommendations aggregated across reports
//! - a parameter trend and the severity breakdown
//! - a failed refresh, which keeps the previously loaded reports

use std::sync::Arc;

use labdash_contracts::{error::DashResult, parameter::AbnormalParameter, report::Report};
use labdash_core::{
    history::{parameter_names, parameter_trend, severity_breakdown, SeverityBreakdown, TrendPoint},
    Dashboard, ReportQuery, ReportView, SortDirection, SortKey,
};
use labdash_storage::MemoryTokenStore;

use crate::{
    backend::InMemoryBackend,
    mock_data::{DEMO_EMAIL, DEMO_PASSWORD},
};

/// What the walkthrough observed.
#[derive(Debug)]
pub struct HistoryWalkthrough {
    pub newest_first: Vec<String>,
    pub by_lab: Vec<(String, String)>,
    pub quest_matches: Vec<String>,
    pub recommendation_ids: Vec<String>,
    pub parameters: Vec<String>,
    pub hemoglobin: Vec<TrendPoint>,
    pub breakdown: SeverityBreakdown,
    pub reports_after_failed_refresh: usize,
    pub refresh_error: Option<String>,
}

pub fn walk_history() -> DashResult<HistoryWalkthrough> {
    let backend = Arc::new(InMemoryBackend::seeded()?);
    let dash = Dashboard::new(backend.clone(), backend.clone(), Arc::new(MemoryTokenStore::new()));
    dash.login(DEMO_EMAIL, DEMO_PASSWORD)?;

    let mut view = ReportView::new();
    let ids = |reports: Vec<Report>| -> Vec<String> {
        reports.into_iter().map(|r| r.id).collect()
    };

    let newest_first = ids(view.query(dash.store(), &ReportQuery::default()));
    let by_lab = view
        .query(dash.store(), &ReportQuery::sorted(SortKey::Lab, SortDirection::Asc))
        .into_iter()
        .map(|r| (r.id, r.report_info.lab_name))
        .collect();
    let quest_matches = ids(view.query(dash.store(), &ReportQuery::search("quest")));

    let recommendation_ids = dash.store().recommendations().into_iter().map(|r| r.id).collect();

    let reports = dash.store().reports();
    let abnormal: Vec<AbnormalParameter> = reports
        .iter()
        .flat_map(|r| r.abnormal_parameters.iter().cloned())
        .collect();

    backend.fail_next_list("HTTP 503: upstream unavailable")?;
    let _ = dash.refresh();

    Ok(HistoryWalkthrough {
        newest_first,
        by_lab,
        quest_matches,
        recommendation_ids,
        parameters: parameter_names(&reports),
        hemoglobin: parameter_trend(&reports, "Hemoglobin"),
        breakdown: severity_breakdown(&abnormal),
        reports_after_failed_refresh: dash.store().len(),
        refresh_error: dash.store().last_error(),
    })
}

/// Run Scenario 1: Report History.
pub fn run_scenario() -> DashResult<()> {
    println!("=== Scenario 1: Report History ===");
    println!();

    let walk = walk_history()?;

    println!("  Reports, newest first:     {}", walk.newest_first.join(", "));
    println!("  Reports by lab (A-Z):");
    for (id, lab) in &walk.by_lab {
        println!("    {:<10} {}", id, lab);
    }
    println!("  Search \"quest\":            {}", walk.quest_matches.join(", "));
    println!("  Aggregated recommendations: {}", walk.recommendation_ids.join(", "));
    println!("  Tracked parameters:        {}", walk.parameters.join(", "));
    println!("  Hemoglobin trend:");
    for point in &walk.hemoglobin {
        println!(
            "    {}  {:>5.1}  {}",
            point.report_date,
            point.value,
            if point.is_abnormal { "ABNORMAL" } else { "normal" }
        );
    }
    println!(
        "  Abnormal by severity:      mild {} / moderate {} / severe {}",
        walk.breakdown.mild, walk.breakdown.moderate, walk.breakdown.severe
    );
    println!(
        "  Failed refresh:            {} report(s) kept, error = {}",
        walk.reports_after_failed_refresh,
        walk.refresh_error.as_deref().unwrap_or("none")
    );
    println!("  RESULT: SUCCESS");
    println!();
    Ok(())
}
