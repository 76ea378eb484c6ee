//! Suggested actions derived from abnormal parameters.

use serde::{Deserialize, Serialize};

/// A recommendation embedded in its owning report.
///
/// The aggregated recommendation list holds clones of these; the report
/// remains the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(default)]
    pub report_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: String,
    /// Parameter names this recommendation addresses.
    #[serde(default)]
    pub related_parameters: Vec<String>,
    /// Ordered action steps.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
