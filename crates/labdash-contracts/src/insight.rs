//! Narrative insights linking abnormal parameters to health conditions.

use serde::{Deserialize, Serialize};

/// Severity vocabulary used by insights. The backend mixes the risk scale
/// (`low`..`critical`) with the parameter scale (`mild`..`severe`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Low,
    Medium,
    High,
    Critical,
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Older records use a Mongo-style `_id`.
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "reportId")]
    pub report_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: InsightSeverity,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub related_parameters: Vec<String>,
    #[serde(default)]
    pub details: String,
    /// Free-text suggestions attached to the insight.
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub possible_causes: Vec<String>,
    #[serde(default)]
    pub action_required: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
