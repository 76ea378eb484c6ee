//! Simulated lab data for the LABDASH reference backend.
//!
//! All data in this module is hardcoded and fictional. It is written in the
//! backend's wire format and decoded through the same serde types the HTTP
//! client uses, so a malformed fixture fails exactly like a malformed
//! server response would.

use serde_json::{json, Value};

use labdash_contracts::{api::decode, error::DashResult, report::Report, user::User};

/// Login of the seeded demo account.
pub const DEMO_EMAIL: &str = "avery@example.org";
pub const DEMO_PASSWORD: &str = "labdash-demo";

// ── Demo user (mock) ──────────────────────────────────────────────────────────

pub fn demo_user_json() -> Value {
    json!({
        "_id": "user-001",
        "full_name": "Avery Stone",
        "email": DEMO_EMAIL,
        "profile": {
            "age": 42,
            "gender": "female",
            "health_conditions": ["seasonal allergies"],
            "blood_group": "O+"
        },
        "settings": {
            "preferred_units": "metric",
            "theme": "light",
            "notification_preferences": {
                "email": true,
                "push": false,
                "sms": false,
                "report_ready": true,
                "insights_update": true,
                "recommendations": true
            }
        },
        "created_at": "2023-11-02T09:15:00Z"
    })
}

pub fn demo_user() -> DashResult<User> {
    decode("demo user", demo_user_json())
}

// ── Reports (mock) ────────────────────────────────────────────────────────────

fn parameter(name: &str, value: f64, unit: &str, range: &str, abnormal: Option<(&str, &str)>) -> Value {
    let mut p = json!({
        "name": name,
        "value": value,
        "unit": unit,
        "reference_range": range,
        "is_abnormal": abnormal.is_some(),
    });
    if let Some((direction, severity)) = abnormal {
        p["direction"] = json!(direction);
        p["severity"] = json!(severity);
    }
    p
}

fn flagged(section: &str, param: &Value) -> Value {
    let mut a = param.clone();
    a["section"] = json!(section);
    a
}

/// Three reports, deliberately out of date order: January, March, February.
pub fn mock_reports_json() -> Vec<Value> {
    let ferritin = parameter("Ferritin", 18.0, "ng/mL", "20 - 250", Some(("low", "mild")));
    let ldl = parameter("LDL Cholesterol", 162.0, "mg/dL", "0 - 130", Some(("high", "moderate")));
    let hgb_low = parameter("Hemoglobin", 12.9, "g/dL", "13.5 - 17.5", Some(("low", "mild")));

    vec![
        json!({
            "id": "rep-001",
            "user_id": "user-001",
            "filename": "quest_cbc_jan.pdf",
            "status": "completed",
            "created_at": "2024-01-03T10:00:00Z",
            "report_info": {
                "report_id": "QD-88412",
                "report_type": "Complete Blood Count",
                "report_date": "2024-01-01",
                "lab_name": "Quest Diagnostics"
            },
            "patient_info": { "name": "Avery Stone", "age": 42, "gender": "female" },
            "test_sections": [{
                "section_id": "cbc",
                "section_name": "Complete Blood Count",
                "parameters": [
                    parameter("Hemoglobin", 13.8, "g/dL", "13.5 - 17.5", None),
                    ferritin.clone(),
                ]
            }],
            "abnormal_parameters": [flagged("Complete Blood Count", &ferritin)],
            "insights": [{
                "id": "ins-001",
                "report_id": "rep-001",
                "title": "Iron stores slightly low",
                "description": "Ferritin is just below the reference range while hemoglobin is normal.",
                "severity": "mild",
                "category": "hematology",
                "related_parameters": ["Ferritin"],
                "recommendations": ["Include iron-rich foods", "Recheck ferritin in three months"]
            }],
            "recommendations": [{
                "id": "rec-001",
                "report_id": "rep-001",
                "title": "Add iron-rich foods",
                "description": "Lentils, spinach and lean red meat help restore iron stores.",
                "category": "diet",
                "priority": "medium",
                "related_parameters": ["Ferritin"]
            }]
        }),
        json!({
            "id": "rep-002",
            "user_id": "user-001",
            "filename": "mayo_lipids_mar.pdf",
            "status": "completed",
            "created_at": "2024-03-02T08:30:00Z",
            "report_info": {
                "report_id": "MC-20931",
                "report_type": "Lipid Panel",
                "report_date": "2024-03-01",
                "lab_name": "Mayo Clinic Laboratories"
            },
            "test_sections": [
                {
                    "section_id": "lipids",
                    "section_name": "Lipid Panel",
                    "parameters": [
                        ldl.clone(),
                        parameter("HDL Cholesterol", 52.0, "mg/dL", "40 - 60", None),
                    ]
                },
                {
                    "section_id": "cbc",
                    "section_name": "Complete Blood Count",
                    "parameters": [hgb_low.clone()]
                }
            ],
            "abnormal_parameters": [
                flagged("Lipid Panel", &ldl),
                flagged("Complete Blood Count", &hgb_low),
            ],
            "insights": [{
                "id": "ins-002",
                "report_id": "rep-002",
                "title": "Elevated LDL cholesterol",
                "description": "LDL is moderately above the recommended limit.",
                "severity": "moderate",
                "category": "cardiovascular",
                "related_parameters": ["LDL Cholesterol"],
                "action_required": true
            }],
            "recommendations": [
                {
                    "id": "rec-002",
                    "report_id": "rep-002",
                    "title": "Reduce saturated fat",
                    "category": "diet",
                    "priority": "high",
                    "related_parameters": ["LDL Cholesterol"]
                },
                {
                    "id": "rec-003",
                    "report_id": "rep-002",
                    "title": "Thirty minutes of brisk walking daily",
                    "category": "lifestyle",
                    "priority": "medium"
                }
            ]
        }),
        json!({
            "id": "rep-003",
            "user_id": "user-001",
            "filename": "labcorp_metabolic_feb.pdf",
            "status": "completed",
            "created_at": "2024-02-02T14:45:00Z",
            "report_info": {
                "report_id": "LC-55120",
                "report_type": "Basic Metabolic Panel",
                "report_date": "2024-02-01",
                "lab_name": "LabCorp"
            },
            "test_sections": [{
                "section_id": "bmp",
                "section_name": "Basic Metabolic Panel",
                "parameters": [
                    parameter("Glucose", 98.0, "mg/dL", "70 - 99", None),
                    parameter("Hemoglobin", 13.6, "g/dL", "13.5 - 17.5", None),
                ]
            }],
            "abnormal_parameters": [],
            "insights": [{
                "id": "ins-003",
                "report_id": "rep-003",
                "title": "Metabolic panel within range",
                "severity": "low",
                "category": "metabolic"
            }],
            "recommendations": [{
                "id": "rec-004",
                "report_id": "rep-003",
                "title": "Keep current routine",
                "category": "lifestyle",
                "priority": "low"
            }]
        }),
    ]
}

pub fn mock_reports() -> DashResult<Vec<Report>> {
    mock_reports_json()
        .into_iter()
        .map(|value| decode("mock report", value))
        .collect()
}

/// Wire JSON for a freshly uploaded report: no sections or annotations yet,
/// plus a single placeholder insight so the detail view is well-formed.
pub fn uploaded_report_json(id: &str, file_name: &str, mime: &str, size: u64, today: &str) -> Value {
    json!({
        "id": id,
        "user_id": "user-001",
        "filename": file_name,
        "status": "processing",
        "created_at": today,
        "report_info": {
            "report_id": id,
            "report_type": "Uploaded Report",
            "report_date": today,
            "lab_name": "Pending analysis"
        },
        "file": { "original_filename": file_name, "mime_type": mime, "size": size },
        "insights": [{
            "id": format!("ins-{}", id),
            "report_id": id,
            "title": "Analysis in progress",
            "severity": "low",
            "category": "processing"
        }]
    })
}
