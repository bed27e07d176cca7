//! Onboarding preference models and the API ↔ store field mapping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system the user prefers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(format!("unknown units: {other}")),
        }
    }
}

/// UI color theme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Preferences as the API sees them (camelCase on the wire).
///
/// Every field is optional. Absent fields are omitted when serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_features: Option<Vec<String>>,
}

/// The store-side field set (snake_case columns of `onboarding_preferences`).
///
/// Written in full on every save: a `None` here overwrites the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferenceFields {
    pub display_name: Option<String>,
    pub units: Option<Units>,
    pub theme: Option<Theme>,
    pub content_types: Option<Vec<String>>,
    pub ai_features: Option<Vec<String>>,
}

/// A persisted preference row. At most one exists per `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPreferenceRecord {
    pub id: String,
    pub user_id: String,
    pub fields: PreferenceFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OnboardingPreferences> for PreferenceFields {
    fn from(p: OnboardingPreferences) -> Self {
        Self {
            display_name: p.display_name,
            units: p.units,
            theme: p.theme,
            content_types: p.content_types,
            ai_features: p.ai_features,
        }
    }
}

impl From<PreferenceFields> for OnboardingPreferences {
    fn from(f: PreferenceFields) -> Self {
        Self {
            display_name: f.display_name,
            units: f.units,
            theme: f.theme,
            content_types: f.content_types,
            ai_features: f.ai_features,
        }
    }
}

impl From<StoredPreferenceRecord> for OnboardingPreferences {
    fn from(record: StoredPreferenceRecord) -> Self {
        record.fields.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> OnboardingPreferences {
        OnboardingPreferences {
            display_name: Some("Ada".into()),
            units: Some(Units::Metric),
            theme: Some(Theme::Dark),
            content_types: Some(vec!["news".into()]),
            ai_features: Some(vec!["summarize".into()]),
        }
    }

    #[test]
    fn deserializes_camel_case_body() {
        let body = r#"{"displayName":"Ada","units":"metric","theme":"dark","contentTypes":["news"],"aiFeatures":["summarize"]}"#;
        let parsed: OnboardingPreferences = serde_json::from_str(body).unwrap();
        assert_eq!(parsed, ada());
    }

    #[test]
    fn empty_body_is_all_none() {
        let parsed: OnboardingPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, OnboardingPreferences::default());
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let result = serde_json::from_str::<OnboardingPreferences>(r#"{"theme":"sepia"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialization_omits_absent_fields() {
        let prefs = OnboardingPreferences {
            theme: Some(Theme::System),
            ..Default::default()
        };
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json, serde_json::json!({"theme": "system"}));
    }

    #[test]
    fn mapping_preserves_values_and_order() {
        let mut prefs = ada();
        prefs.content_types = Some(vec!["news".into(), "sports".into(), "art".into()]);

        let fields = PreferenceFields::from(prefs.clone());
        assert_eq!(fields.display_name.as_deref(), Some("Ada"));
        assert_eq!(
            fields.content_types.as_deref(),
            Some(&["news".to_string(), "sports".to_string(), "art".to_string()][..])
        );

        let back = OnboardingPreferences::from(fields);
        assert_eq!(back, prefs);
    }

    #[test]
    fn enum_string_forms() {
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!(Theme::Light.to_string(), "light");
        assert!("METRIC".parse::<Units>().is_err());
    }
}
