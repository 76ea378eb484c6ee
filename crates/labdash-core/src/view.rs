//! Filter and sort transforms over a report snapshot.
//!
//! Everything here is read-only: the functions borrow a slice of reports and
//! return references into it in the requested order. Sorting is stable, so
//! reports that compare equal keep their original relative order in both
//! directions.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use labdash_contracts::{report::Report, time::parse_timestamp};

use crate::store::ReportStore;

/// Column a report list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Report date; missing dates sort as the Unix epoch.
    #[default]
    Date,
    /// Lab name, compared case-insensitively.
    Lab,
    /// Number of abnormal parameters.
    AbnormalCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Inclusive range of report dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Everything that shapes a report list.
///
/// The default query matches every report and orders newest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportQuery {
    /// Free-text term matched against lab name and report date.
    pub search: String,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    /// Keep only reports with at least one abnormal parameter.
    pub abnormal_only: bool,
    /// Keep only these report types (case-insensitive). Empty keeps all.
    pub report_types: Vec<String>,
    /// Keep only reports dated inside this range. Undated reports are
    /// excluded when a range is set.
    pub date_range: Option<DateRange>,
}

impl ReportQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    pub fn sorted(key: SortKey, direction: SortDirection) -> Self {
        Self {
            sort_key: key,
            direction,
            ..Self::default()
        }
    }

    fn accepts(&self, report: &Report) -> bool {
        if !matches_search(report, &self.search) {
            return false;
        }
        if self.abnormal_only && report.abnormal_count() == 0 {
            return false;
        }
        if !self.report_types.is_empty()
            && !self
                .report_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&report.report_info.report_type))
        {
            return false;
        }
        if let Some(range) = &self.date_range {
            let date = parse_timestamp(&report.report_info.report_date).map(|dt| dt.date_naive());
            if !date.is_some_and(|d| range.contains(d)) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring match of `term` against the lab name or the
/// report date string. An empty term matches everything.
pub fn matches_search(report: &Report, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    report.report_info.lab_name.to_lowercase().contains(&needle)
        || report.report_info.report_date.to_lowercase().contains(&needle)
}

/// Reports matching `term`, in their original order.
pub fn filter_reports<'a>(reports: &'a [Report], term: &str) -> Vec<&'a Report> {
    reports.iter().filter(|r| matches_search(r, term)).collect()
}

fn compare(a: &Report, b: &Report, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date_millis().cmp(&b.date_millis()),
        SortKey::Lab => a
            .report_info
            .lab_name
            .to_lowercase()
            .cmp(&b.report_info.lab_name.to_lowercase()),
        SortKey::AbnormalCount => a.abnormal_count().cmp(&b.abnormal_count()),
    }
}

fn directed(a: &Report, b: &Report, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = compare(a, b, key);
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Stable in-place sort.
pub fn sort_reports(reports: &mut [&Report], key: SortKey, direction: SortDirection) {
    reports.sort_by(|a, b| directed(a, b, key, direction));
}

/// Positions of the reports `query` selects, in display order.
fn ordered_positions(reports: &[Report], query: &ReportQuery) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..reports.len())
        .filter(|&i| query.accepts(&reports[i]))
        .collect();
    positions.sort_by(|&a, &b| directed(&reports[a], &reports[b], query.sort_key, query.direction));
    positions
}

/// Filter then sort.
pub fn apply_query<'a>(reports: &'a [Report], query: &ReportQuery) -> Vec<&'a Report> {
    ordered_positions(reports, query)
        .into_iter()
        .map(|i| &reports[i])
        .collect()
}

// ── Memoized view ─────────────────────────────────────────────────────────────

struct CachedView {
    store_id: u64,
    revision: u64,
    query: ReportQuery,
    /// Positions into the store's report list at `revision`.
    order: Vec<usize>,
}

/// A report list view that recomputes only when the store, its revision or
/// the query changes.
#[derive(Default)]
pub struct ReportView {
    cache: Option<CachedView>,
    recomputations: u64,
}

impl ReportView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reports from `store` shaped by `query`.
    pub fn query(&mut self, store: &ReportStore, query: &ReportQuery) -> Vec<Report> {
        let store_id = store.id();
        store.with_reports(|revision, reports| {
            let fresh = matches!(
                &self.cache,
                Some(c) if c.store_id == store_id && c.revision == revision && &c.query == query
            );

            if !fresh {
                let order = ordered_positions(reports, query);
                self.recomputations += 1;
                debug!(revision, recomputations = self.recomputations, "report view recomputed");
                self.cache = Some(CachedView {
                    store_id,
                    revision,
                    query: query.clone(),
                    order,
                });
            }

            self.cache
                .as_ref()
                .map(|c| c.order.iter().filter_map(|&i| reports.get(i).cloned()).collect())
                .unwrap_or_default()
        })
    }

    /// How many times the view has actually been recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{report, with_parameter};

    fn ids(reports: &[&Report]) -> Vec<String> {
        reports.iter().map(|r| r.id.clone()).collect()
    }

    fn sample() -> Vec<Report> {
        vec![
            report("jan", "Quest Diagnostics", "2024-01-01"),
            report("mar", "LabCorp", "2024-03-01"),
            report("feb", "quest diagnostics", "2024-02-01"),
        ]
    }

    // ── filtering ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_term_returns_all_in_order() {
        let reports = sample();
        assert_eq!(ids(&filter_reports(&reports, "")), vec!["jan", "mar", "feb"]);
    }

    #[test]
    fn search_matches_lab_name_case_insensitively() {
        let reports = sample();
        assert_eq!(ids(&filter_reports(&reports, "QUEST")), vec!["jan", "feb"]);
    }

    #[test]
    fn search_matches_date_string() {
        let reports = sample();
        assert_eq!(ids(&filter_reports(&reports, "2024-03")), vec!["mar"]);
        assert!(filter_reports(&reports, "1999").is_empty());
    }

    #[test]
    fn filtered_results_always_contain_term() {
        let reports = sample();
        for term in ["q", "Lab", "01", "corp", "-02-", "zzz"] {
            let lower = term.to_lowercase();
            for r in filter_reports(&reports, term) {
                assert!(
                    r.report_info.lab_name.to_lowercase().contains(&lower)
                        || r.report_info.report_date.to_lowercase().contains(&lower),
                    "{} does not contain {}",
                    r.id,
                    term
                );
            }
        }
    }

    // ── sorting ───────────────────────────────────────────────────────────────

    #[test]
    fn date_descending_orders_newest_first() {
        let reports = sample();
        let view = apply_query(&reports, &ReportQuery::sorted(SortKey::Date, SortDirection::Desc));
        assert_eq!(ids(&view), vec!["mar", "feb", "jan"]);
    }

    #[test]
    fn ascending_and_descending_are_exact_reverses_without_ties() {
        let reports = sample();
        let asc = ids(&apply_query(&reports, &ReportQuery::sorted(SortKey::Date, SortDirection::Asc)));
        let mut desc =
            ids(&apply_query(&reports, &ReportQuery::sorted(SortKey::Date, SortDirection::Desc)));
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn missing_date_sorts_as_epoch() {
        let reports = vec![report("dated", "A", "2024-01-01"), report("undated", "B", "")];
        let view = apply_query(&reports, &ReportQuery::sorted(SortKey::Date, SortDirection::Asc));
        assert_eq!(ids(&view), vec!["undated", "dated"]);
    }

    #[test]
    fn ties_keep_original_order_in_both_directions() {
        let reports = vec![
            report("a", "Quest", "2024-01-01"),
            report("b", "quest", "2024-02-01"),
            report("c", "Mayo", "2024-03-01"),
        ];
        let asc = apply_query(&reports, &ReportQuery::sorted(SortKey::Lab, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["c", "a", "b"]);
        let desc = apply_query(&reports, &ReportQuery::sorted(SortKey::Lab, SortDirection::Desc));
        assert_eq!(ids(&desc), vec!["a", "b", "c"]);
    }

    #[test]
    fn abnormal_count_sort() {
        let reports = vec![
            with_parameter(report("one", "A", "2024-01-01"), "LDL", 170.0, "0 - 130", Some(("high", "mild"))),
            report("zero", "B", "2024-01-02"),
            with_parameter(
                with_parameter(report("two", "C", "2024-01-03"), "HDL", 20.0, "40 - 60", Some(("low", "severe"))),
                "TG",
                400.0,
                "0 - 150",
                Some(("high", "moderate")),
            ),
        ];
        let view = apply_query(&reports, &ReportQuery::sorted(SortKey::AbnormalCount, SortDirection::Desc));
        assert_eq!(ids(&view), vec!["two", "one", "zero"]);
    }

    // ── extra filters ─────────────────────────────────────────────────────────

    #[test]
    fn abnormal_only_and_type_filters() {
        let mut urine = report("urine", "Quest", "2024-01-05");
        urine.report_info.report_type = "Urinalysis".to_string();
        let reports = vec![
            with_parameter(report("flagged", "Quest", "2024-01-01"), "LDL", 170.0, "0 - 130", Some(("high", "mild"))),
            report("clean", "Quest", "2024-01-02"),
            urine,
        ];

        let abnormal = ReportQuery {
            abnormal_only: true,
            ..ReportQuery::default()
        };
        assert_eq!(ids(&apply_query(&reports, &abnormal)), vec!["flagged"]);

        let urinalysis = ReportQuery {
            report_types: vec!["urinalysis".to_string()],
            ..ReportQuery::default()
        };
        assert_eq!(ids(&apply_query(&reports, &urinalysis)), vec!["urine"]);
    }

    #[test]
    fn date_range_is_inclusive_and_drops_undated() {
        let mut reports = sample();
        reports.push(report("undated", "Quest", ""));
        let query = ReportQuery {
            date_range: Some(DateRange {
                from: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            }),
            sort_key: SortKey::Date,
            direction: SortDirection::Asc,
            ..ReportQuery::default()
        };
        assert_eq!(ids(&apply_query(&reports, &query)), vec!["feb", "mar"]);
    }

    // ── memoized view ─────────────────────────────────────────────────────────

    #[test]
    fn view_recomputes_only_on_revision_or_query_change() {
        let store = ReportStore::new();
        for r in sample().into_iter().rev() {
            store.add(r);
        }
        let mut view = ReportView::new();
        let query = ReportQuery::sorted(SortKey::Date, SortDirection::Desc);

        let first = view.query(&store, &query);
        let second = view.query(&store, &query);
        assert_eq!(first, second);
        assert_eq!(view.recomputations(), 1);

        view.query(&store, &ReportQuery::search("labcorp"));
        assert_eq!(view.recomputations(), 2);

        store.add(report("apr", "Mayo", "2024-04-01"));
        let after_add = view.query(&store, &ReportQuery::search("labcorp"));
        assert_eq!(view.recomputations(), 3);
        assert_eq!(after_add.len(), 1);

        let sorted = view.query(&store, &query);
        let got: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["apr", "mar", "feb", "jan"]);
    }

    #[test]
    fn view_shared_across_stores_at_same_revision() {
        let full = ReportStore::new();
        full.add(report("jan", "Quest", "2024-01-01"));
        full.add(report("feb", "Mayo", "2024-02-01"));

        let emptied = ReportStore::new();
        emptied.add(report("tmp", "LabCorp", "2024-03-01"));
        emptied.remove("tmp");
        assert_eq!(full.revision(), emptied.revision());

        let mut view = ReportView::new();
        let query = ReportQuery::default();
        assert_eq!(view.query(&full, &query).len(), 2);
        assert!(view.query(&emptied, &query).is_empty());
        assert_eq!(view.recomputations(), 2);

        let again: Vec<_> = view.query(&full, &query).into_iter().map(|r| r.id).collect();
        assert_eq!(again, vec!["feb", "jan"]);
    }
}
