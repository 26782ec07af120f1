//! Application settings snapshot and import-time validation.
//!
//! # Responsibility
//! - Define the settings fields that travel inside export files.
//! - Validate untrusted settings field by field before any merge.
//!
//! # Invariants
//! - Only enumerated values are accepted; anything else is dropped and
//!   reported, never applied.
//! - The AI API key is never written into export files.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// UI and AI output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Zh,
    Ja,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Zh => "zh",
            Self::Ja => "ja",
        }
    }
}

/// Model identifier passed to the AI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiModel {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "claude-haiku")]
    ClaudeHaiku,
    #[serde(rename = "claude-sonnet")]
    ClaudeSonnet,
}

impl AiModel {
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4o => "gpt-4o",
            Self::ClaudeHaiku => "claude-haiku",
            Self::ClaudeSonnet => "claude-sonnet",
        }
    }
}

/// Application settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub ai_model: AiModel,
    /// Credential for the AI collaborator; kept out of serialized output.
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Accepted subset of an untrusted settings object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub ai_model: Option<AiModel>,
    /// Field names that were present but not accepted.
    pub rejected: Vec<String>,
}

impl SettingsPatch {
    /// Whether at least one field would change something when merged.
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.language.is_none() && self.ai_model.is_none()
    }
}

impl Settings {
    /// Returns a copy with every accepted patch field applied.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            language: patch.language.unwrap_or(self.language),
            ai_model: patch.ai_model.unwrap_or(self.ai_model),
            api_key: self.api_key.clone(),
        }
    }
}

/// Validates an untrusted settings value field by field.
///
/// Unknown keys and out-of-enumeration values are recorded in
/// [`SettingsPatch::rejected`] and otherwise ignored.
pub fn validate_settings(raw: &Value) -> SettingsPatch {
    let mut patch = SettingsPatch::default();
    let Some(object) = raw.as_object() else {
        warn!("event=settings_validate module=settings status=skip reason=not_an_object");
        return patch;
    };

    for (field, value) in object {
        let accepted = match field.as_str() {
            "theme" => enumerated::<Theme>(value).map(|theme| patch.theme = Some(theme)),
            "language" => {
                enumerated::<Language>(value).map(|language| patch.language = Some(language))
            }
            "aiModel" => enumerated::<AiModel>(value).map(|model| patch.ai_model = Some(model)),
            _ => None,
        };
        if accepted.is_none() {
            patch.rejected.push(field.clone());
        }
    }

    if !patch.rejected.is_empty() {
        warn!(
            "event=settings_validate module=settings status=partial rejected_fields={}",
            patch.rejected.join(",")
        );
    }
    patch
}

fn enumerated<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    if !value.is_string() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_accepts_enumerated_values_only() {
        let patch = validate_settings(&json!({
            "theme": "bogus",
            "language": "fr",
            "aiModel": "claude-haiku",
            "fontSize": 14
        }));
        assert_eq!(patch.theme, None);
        assert_eq!(patch.language, Some(Language::Fr));
        assert_eq!(patch.ai_model, Some(AiModel::ClaudeHaiku));
        assert!(patch.rejected.contains(&"theme".to_string()));
        assert!(patch.rejected.contains(&"fontSize".to_string()));
    }

    #[test]
    fn merge_applies_only_accepted_fields() {
        let current = Settings {
            theme: Theme::Dark,
            api_key: Some("secret".into()),
            ..Settings::default()
        };
        let patch = validate_settings(&json!({ "theme": "bogus", "language": "ja" }));
        let merged = current.merged(&patch);
        assert_eq!(merged.theme, Theme::Dark);
        assert_eq!(merged.language, Language::Ja);
        assert_eq!(merged.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn api_key_is_never_serialized() {
        let settings = Settings {
            api_key: Some("secret".into()),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"aiModel\":\"gpt-4o-mini\""));
    }
}
