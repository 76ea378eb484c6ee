//! Lab test parameters and their abnormality annotations.
//!
//! On the wire a parameter carries `is_abnormal`, `direction` and `severity`
//! as three independent fields. In memory they collapse into a single
//! `Option<AbnormalFlag>`, so an abnormal parameter without a direction or
//! severity cannot be represented. Payloads that violate this are rejected
//! at decode time.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DashError;

/// Which side of the reference range a value falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

/// How far outside the reference range a value is. Ordered mild < severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

/// Direction and severity of an out-of-range value. Present only on
/// abnormal parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbnormalFlag {
    pub direction: Direction,
    pub severity: Severity,
}

/// A reading as printed on the report. Qualitative tests (urinalysis,
/// serology) report text such as `"Negative"`; everything else is numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Numeric(f64),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(n: f64) -> Self {
        Self::Numeric(n)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => f.pad(&n.to_string()),
            Self::Text(s) => f.pad(s),
        }
    }
}

/// Some lab exports quote numeric values; a quoted number decodes as
/// `Numeric`, any other text as `Text`.
impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrText {
            Number(f64),
            Text(String),
        }

        Ok(match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(n) => Self::Numeric(n),
            NumberOrText::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) => Self::Numeric(n),
                Err(_) => Self::Text(s),
            },
        })
    }
}

/// A single measured value within a test section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireParameter", into = "WireParameter")]
pub struct Parameter {
    pub name: String,
    pub code: Option<String>,
    pub value: ParameterValue,
    pub unit: String,
    /// Human-readable range as printed on the report, e.g. `"13.5 - 17.5"`.
    pub reference_range: String,
    pub reference_min: Option<f64>,
    pub reference_max: Option<f64>,
    pub category: String,
    /// `Some` exactly when the value is outside its reference range.
    pub abnormality: Option<AbnormalFlag>,
}

impl Parameter {
    /// The reading as a number; `None` for qualitative results.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn is_abnormal(&self) -> bool {
        self.abnormality.is_some()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.abnormality.map(|a| a.direction)
    }

    pub fn severity(&self) -> Option<Severity> {
        self.abnormality.map(|a| a.severity)
    }
}

/// An abnormal parameter as listed in a report's `abnormal_parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbnormalParameter {
    #[serde(flatten)]
    pub parameter: Parameter,
    /// Name of the test section the parameter came from.
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub percent_deviation: Option<f64>,
    #[serde(default)]
    pub potential_causes: Vec<String>,
}

// ── Wire representation ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct WireParameter {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    value: ParameterValue,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    reference_range: String,
    #[serde(default)]
    reference_min: Option<f64>,
    #[serde(default)]
    reference_max: Option<f64>,
    #[serde(default)]
    is_abnormal: bool,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    category: String,
}

impl TryFrom<WireParameter> for Parameter {
    type Error = DashError;

    fn try_from(wire: WireParameter) -> Result<Self, Self::Error> {
        let abnormality = if wire.is_abnormal {
            match (wire.direction, wire.severity) {
                (Some(direction), Some(severity)) => Some(AbnormalFlag { direction, severity }),
                _ => {
                    return Err(DashError::validation(format!(
                        "parameter '{}' is flagged abnormal without direction and severity",
                        wire.name
                    )))
                }
            }
        } else {
            None
        };

        Ok(Self {
            name: wire.name,
            code: wire.code,
            value: wire.value,
            unit: wire.unit,
            reference_range: wire.reference_range,
            reference_min: wire.reference_min,
            reference_max: wire.reference_max,
            category: wire.category,
            abnormality,
        })
    }
}

impl From<Parameter> for WireParameter {
    fn from(p: Parameter) -> Self {
        Self {
            name: p.name,
            code: p.code,
            value: p.value,
            unit: p.unit,
            reference_range: p.reference_range,
            reference_min: p.reference_min,
            reference_max: p.reference_max,
            is_abnormal: p.abnormality.is_some(),
            direction: p.abnormality.map(|a| a.direction),
            severity: p.abnormality.map(|a| a.severity),
            category: p.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn abnormal_parameter_requires_direction_and_severity() {
        let missing = json!({
            "name": "Hemoglobin",
            "value": 10.2,
            "unit": "g/dL",
            "reference_range": "13.5 - 17.5",
            "is_abnormal": true,
            "direction": "low"
        });
        let err = serde_json::from_value::<Parameter>(missing).unwrap_err();
        assert!(err.to_string().contains("Hemoglobin"));
    }

    #[test]
    fn abnormal_parameter_decodes_flag() {
        let p: Parameter = serde_json::from_value(json!({
            "name": "LDL",
            "value": 172,
            "unit": "mg/dL",
            "reference_range": "0 - 130",
            "is_abnormal": true,
            "direction": "high",
            "severity": "moderate",
            "category": "lipid"
        }))
        .unwrap();

        assert!(p.is_abnormal());
        assert_eq!(p.direction(), Some(Direction::High));
        assert_eq!(p.severity(), Some(Severity::Moderate));
        assert_eq!(p.numeric_value(), Some(172.0));
    }

    #[test]
    fn normal_parameter_drops_stray_direction() {
        let p: Parameter = serde_json::from_value(json!({
            "name": "Glucose",
            "value": "92.5",
            "is_abnormal": false,
            "direction": "high"
        }))
        .unwrap();

        assert!(!p.is_abnormal());
        assert_eq!(p.direction(), None);
        assert_eq!(p.value, ParameterValue::Numeric(92.5));
    }

    #[test]
    fn qualitative_value_decodes_as_text() {
        let p: Parameter = serde_json::from_value(json!({
            "name": "Nitrite",
            "value": "Negative",
            "reference_range": "Negative",
            "category": "urinalysis"
        }))
        .unwrap();

        assert_eq!(p.value, ParameterValue::Text("Negative".to_string()));
        assert_eq!(p.numeric_value(), None);
        assert_eq!(format!("{:>9}", p.value), " Negative");
        assert_eq!(serde_json::to_value(&p).unwrap()["value"], json!("Negative"));
    }

    #[test]
    fn serialized_form_keeps_flat_wire_fields() {
        let p = Parameter {
            name: "TSH".to_string(),
            code: None,
            value: ParameterValue::Numeric(6.1),
            unit: "mIU/L".to_string(),
            reference_range: "0.4 - 4.0".to_string(),
            reference_min: Some(0.4),
            reference_max: Some(4.0),
            category: "thyroid".to_string(),
            abnormality: Some(AbnormalFlag {
                direction: Direction::High,
                severity: Severity::Mild,
            }),
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["is_abnormal"], json!(true));
        assert_eq!(v["direction"], json!("high"));
        assert_eq!(v["severity"], json!("mild"));
        assert_eq!(v["value"], json!(6.1));
        assert!(v.get("code").is_none());
    }

    #[test]
    fn abnormal_list_entry_carries_section_and_causes() {
        let a: AbnormalParameter = serde_json::from_value(json!({
            "name": "Ferritin",
            "value": 8,
            "unit": "ng/mL",
            "reference_range": "20 - 250",
            "is_abnormal": true,
            "direction": "low",
            "severity": "severe",
            "section": "Iron Studies",
            "percent_deviation": -60.0,
            "potential_causes": ["iron deficiency"]
        }))
        .unwrap();

        assert_eq!(a.section, "Iron Studies");
        assert_eq!(a.parameter.severity(), Some(Severity::Severe));
        assert_eq!(a.potential_causes, vec!["iron deficiency".to_string()]);
    }
}
