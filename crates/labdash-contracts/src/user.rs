//! User account, profile, and settings types.
//!
//! Profile and settings are only ever changed through the patch types
//! below, which merge the fields they carry and leave the rest alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub health_conditions: Vec<String>,
    pub avatar: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_group: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub report_ready: bool,
    pub insights_update: bool,
    pub recommendations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    pub share_data_with_doctors: bool,
    pub allow_anonymous_research: bool,
    pub store_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub preferred_units: Units,
    pub notification_preferences: NotificationPreferences,
    pub theme: Theme,
    pub dashboard_layout: Option<String>,
    pub language: Option<String>,
    pub privacy_settings: Option<PrivacySettings>,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "full_name")]
    pub name: String,
    pub email: String,
    /// Display initials, derived from `name` by the session store.
    #[serde(default)]
    pub initials: String,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub settings: UserSettings,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// First letter of each whitespace-separated part of `name`, uppercased,
/// at most two letters.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub health_conditions: Option<Vec<String>>,
    pub avatar: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_group: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut UserProfile) {
        if let Some(v) = self.age {
            profile.age = Some(v);
        }
        if let Some(v) = self.gender {
            profile.gender = Some(v);
        }
        if let Some(v) = self.health_conditions {
            profile.health_conditions = v;
        }
        if let Some(v) = self.avatar {
            profile.avatar = Some(v);
        }
        if let Some(v) = self.height {
            profile.height = Some(v);
        }
        if let Some(v) = self.weight {
            profile.weight = Some(v);
        }
        if let Some(v) = self.blood_group {
            profile.blood_group = Some(v);
        }
        if let Some(v) = self.date_of_birth {
            profile.date_of_birth = Some(v);
        }
        if let Some(v) = self.phone_number {
            profile.phone_number = Some(v);
        }
        if let Some(v) = self.address {
            profile.address = Some(v);
        }
        if let Some(v) = self.emergency_contact {
            profile.emergency_contact = Some(v);
        }
    }
}

/// Partial settings update. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub preferred_units: Option<Units>,
    pub notification_preferences: Option<NotificationPreferences>,
    pub theme: Option<Theme>,
    pub dashboard_layout: Option<String>,
    pub language: Option<String>,
    pub privacy_settings: Option<PrivacySettings>,
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut UserSettings) {
        if let Some(v) = self.preferred_units {
            settings.preferred_units = v;
        }
        if let Some(v) = self.notification_preferences {
            settings.notification_preferences = v;
        }
        if let Some(v) = self.theme {
            settings.theme = v;
        }
        if let Some(v) = self.dashboard_layout {
            settings.dashboard_layout = Some(v);
        }
        if let Some(v) = self.language {
            settings.language = Some(v);
        }
        if let Some(v) = self.privacy_settings {
            settings.privacy_settings = Some(v);
        }
    }
}
