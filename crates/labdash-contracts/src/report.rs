//! Lab report records as served by the backend.
//!
//! A `Report` is created on upload and never edited field by field: the
//! client only ever replaces the whole record.

use serde::{Deserialize, Serialize};

use crate::{
    error::DashError,
    insight::Insight,
    parameter::{AbnormalParameter, Parameter},
    recommendation::Recommendation,
    time::epoch_millis,
};

/// Server-side processing state of an uploaded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Metadata extracted from the report header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInfo {
    pub report_id: String,
    pub report_type: String,
    /// Date printed on the report. Kept verbatim; see `Report::date_millis`.
    pub report_date: String,
    pub lab_name: String,
    pub processing_timestamp: String,
}

/// Patient details as printed on the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInfo {
    pub name: String,
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
}

/// A named group of parameters, e.g. "Complete Blood Count".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSection {
    #[serde(default)]
    pub section_id: String,
    pub section_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingInfo {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInfo {
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodAdvice {
    pub name: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DietRecommendations {
    pub foods_to_increase: Vec<FoodAdvice>,
    pub foods_to_limit: Vec<FoodAdvice>,
}

/// A parsed lab report with its derived annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub report_info: ReportInfo,
    #[serde(default)]
    pub patient_info: PatientInfo,
    #[serde(default)]
    pub test_sections: Vec<TestSection>,
    #[serde(default)]
    pub abnormal_parameters: Vec<AbnormalParameter>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_recommendations: Option<DietRecommendations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<ProcessingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileInfo>,
}

impl Report {
    /// Report date as epoch milliseconds; missing or unparseable dates are 0.
    pub fn date_millis(&self) -> i64 {
        epoch_millis(Some(self.report_info.report_date.as_str()))
    }

    pub fn abnormal_count(&self) -> usize {
        self.abnormal_parameters.len()
    }

    /// Iterate every parameter across all test sections, in section order.
    pub fn parameters(&self) -> impl Iterator<Item = (&TestSection, &Parameter)> {
        self.test_sections
            .iter()
            .flat_map(|s| s.parameters.iter().map(move |p| (s, p)))
    }
}

/// A report fetched through the detail endpoint. The backend guarantees at
/// least one insight; a detail payload without any is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Report", into = "Report")]
pub struct ReportDetail {
    report: Report,
}

impl ReportDetail {
    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    /// Never empty.
    pub fn insights(&self) -> &[Insight] {
        &self.report.insights
    }
}

impl TryFrom<Report> for ReportDetail {
    type Error = DashError;

    fn try_from(report: Report) -> Result<Self, Self::Error> {
        if report.insights.is_empty() {
            return Err(DashError::fetch(format!(
                "report detail '{}' has no insights",
                report.id
            )));
        }
        Ok(Self { report })
    }
}

impl From<ReportDetail> for Report {
    fn from(detail: ReportDetail) -> Self {
        detail.report
    }
}
