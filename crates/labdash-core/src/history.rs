//! Longitudinal views over a user's reports: parameter trends across
//! reports, severity counts, and the health-score status bands.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use labdash_contracts::{
    parameter::{AbnormalParameter, Severity},
    report::Report,
};

/// `"<min> - <max>"` anywhere in a printed reference range. Bounds may be
/// negative, as in `"-2 - 2"` or `"-10--2"`.
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*-\s*(-?\d+(?:\.\d+)?)").expect("static regex")
});

/// Parse the bounds out of a printed range such as `"13.5 - 17.5 g/dL"`.
pub fn parse_reference_range(range: &str) -> Option<(f64, f64)> {
    let caps = RANGE_RE.captures(range)?;
    let min = caps.get(1)?.as_str().parse().ok()?;
    let max = caps.get(2)?.as_str().parse().ok()?;
    Some((min, max))
}

/// Every distinct parameter name across all reports, sorted.
pub fn parameter_names(reports: &[Report]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|r| r.parameters().map(|(_, p)| p.name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One report's reading of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub report_id: String,
    pub report_date: String,
    pub value: f64,
    pub reference_min: Option<f64>,
    pub reference_max: Option<f64>,
    pub is_abnormal: bool,
}

/// Readings of `name` over time, oldest report first.
///
/// Reports without the parameter, or with a qualitative reading of it, are
/// skipped. Reports sharing a date keep their input order. If a report lists
/// the parameter in more than one section, the last listing wins. Bounds
/// come from the parameter's own `reference_min`/`reference_max` when set,
/// otherwise from the printed range.
pub fn parameter_trend(reports: &[Report], name: &str) -> Vec<TrendPoint> {
    let mut ordered: Vec<&Report> = reports.iter().collect();
    ordered.sort_by_key(|r| r.date_millis());

    ordered
        .into_iter()
        .filter_map(|report| {
            let (_, param) = report.parameters().filter(|(_, p)| p.name == name).last()?;
            let value = param.numeric_value()?;
            let printed = parse_reference_range(&param.reference_range);
            Some(TrendPoint {
                report_id: report.id.clone(),
                report_date: report.report_info.report_date.clone(),
                value,
                reference_min: param.reference_min.or(printed.map(|(min, _)| min)),
                reference_max: param.reference_max.or(printed.map(|(_, max)| max)),
                is_abnormal: report
                    .abnormal_parameters
                    .iter()
                    .any(|a| a.parameter.name == name),
            })
        })
        .collect()
}

/// Count of abnormal parameters at each severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub mild: usize,
    pub moderate: usize,
    pub severe: usize,
}

impl SeverityBreakdown {
    pub fn total(&self) -> usize {
        self.mild + self.moderate + self.severe
    }
}

pub fn severity_breakdown(abnormal: &[AbnormalParameter]) -> SeverityBreakdown {
    abnormal
        .iter()
        .filter_map(|a| a.parameter.severity())
        .fold(SeverityBreakdown::default(), |mut acc, severity| {
            match severity {
                Severity::Mild => acc.mild += 1,
                Severity::Moderate => acc.moderate += 1,
                Severity::Severe => acc.severe += 1,
            }
            acc
        })
}

/// Status band for a 0-100 health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::Excellent,
            s if s >= 75.0 => Self::Good,
            s if s >= 60.0 => Self::Fair,
            s if s >= 40.0 => Self::Poor,
            _ => Self::Critical,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Your health indicators are excellent",
            Self::Good => "Your health indicators are good overall",
            Self::Fair => "Your health indicators need some attention",
            Self::Poor => "Your health indicators need improvement",
            Self::Critical => "Your health indicators need urgent attention",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}
