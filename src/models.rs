use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;

// ============ Database Models ============
//
// Identifier columns are selected as `::bigint` so the rows decode whether the
// schema uses SERIAL or BIGSERIAL keys. A NULL `component_type` is selected
// as an empty string.

/// One translatable UI element (label, placeholder, dropdown part, text).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub content_key: String,
    pub screen_location: String,
    pub component_type: String,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Localized text of one content item in one language.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContentTranslation {
    pub id: i64,
    pub content_item_id: i64,
    pub language_code: String,
    pub content_value: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentTranslation {
    pub fn translation_status(&self) -> TranslationStatus {
        TranslationStatus::from(self.status.as_deref().unwrap_or(""))
    }
}

/// Joined item/translation row used to assemble dropdown configs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DropdownSourceRow {
    pub content_key: String,
    pub component_type: String,
    pub language_code: String,
    pub content_value: Option<String>,
    pub screen_location: String,
}

/// Approved, active content of a screen in one language.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScreenContentRow {
    pub content_key: String,
    pub component_type: String,
    pub category: Option<String>,
    pub content_value: Option<String>,
    pub language_code: String,
    pub status: Option<String>,
}

/// A row of `dropdown_configs`.
#[derive(Debug, Clone, FromRow)]
pub struct DropdownConfig {
    pub id: i64,
    pub dropdown_key: String,
    pub screen_location: String,
    pub field_name: String,
    pub dropdown_data: Json<DropdownData>,
    pub is_active: bool,
}

// ============ Enumerations ============

/// The `component_type` column. Unknown values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    DropdownContainer,
    DropdownOption,
    Option,
    Dropdown,
    Label,
    FieldLabel,
    Placeholder,
    Text,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::DropdownContainer => "dropdown_container",
            ComponentType::DropdownOption => "dropdown_option",
            ComponentType::Option => "option",
            ComponentType::Dropdown => "dropdown",
            ComponentType::Label => "label",
            ComponentType::FieldLabel => "field_label",
            ComponentType::Placeholder => "placeholder",
            ComponentType::Text => "text",
            ComponentType::Other(s) => s.as_str(),
        }
    }

    /// Types that contribute to a dropdown config.
    pub fn is_dropdown_part(&self) -> bool {
        matches!(
            self,
            ComponentType::DropdownContainer
                | ComponentType::DropdownOption
                | ComponentType::Option
                | ComponentType::Placeholder
                | ComponentType::Label
        )
    }

    pub fn is_option(&self) -> bool {
        matches!(self, ComponentType::DropdownOption | ComponentType::Option)
    }

    /// Dropdown part types, bound as a `text[]` in queries.
    pub const DROPDOWN_PART_TYPES: [&'static str; 5] = [
        "dropdown_container",
        "dropdown_option",
        "option",
        "placeholder",
        "label",
    ];
}

impl From<&str> for ComponentType {
    fn from(value: &str) -> Self {
        match value.trim() {
            "dropdown_container" => ComponentType::DropdownContainer,
            "dropdown_option" => ComponentType::DropdownOption,
            "option" => ComponentType::Option,
            "dropdown" | "select" => ComponentType::Dropdown,
            "label" => ComponentType::Label,
            "field_label" => ComponentType::FieldLabel,
            "placeholder" => ComponentType::Placeholder,
            "text" => ComponentType::Text,
            other => ComponentType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    Approved,
    Draft,
    Other,
}

impl TranslationStatus {
    pub const APPROVED: &'static str = "approved";
}

impl From<&str> for TranslationStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => TranslationStatus::Approved,
            "draft" | "pending" => TranslationStatus::Draft,
            _ => TranslationStatus::Other,
        }
    }
}

// ============ JSONB Dropdown Payload ============

/// Language code -> text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    /// Creates an entry with an empty string for every language.
    pub fn empty_for(languages: &[String]) -> Self {
        Self(
            languages
                .iter()
                .map(|lang| (lang.clone(), String::new()))
                .collect(),
        )
    }

    pub fn set(&mut self, language: &str, text: impl Into<String>) {
        self.0.insert(language.to_string(), text.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Text in `language`, falling back to English, then to an empty string.
    /// Empty strings count as missing.
    pub fn resolve(&self, language: &str) -> &str {
        self.get(language)
            .filter(|s| !s.is_empty())
            .or_else(|| self.get("en").filter(|s| !s.is_empty()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub value: String,
    #[serde(default)]
    pub text: LocalizedText,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownMetadata {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub original_keys: Vec<String>,
}

/// The `dropdown_data` JSONB document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownData {
    #[serde(default)]
    pub label: LocalizedText,
    #[serde(default)]
    pub placeholder: LocalizedText,
    #[serde(default)]
    pub options: Vec<DropdownOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DropdownMetadata>,
}

impl DropdownData {
    /// Sorts options numerically by value; non-numeric values go last, by text.
    pub fn sort_options(&mut self) {
        self.options.sort_by(|a, b| {
            match (a.value.parse::<i64>(), b.value.parse::<i64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => a.value.cmp(&b.value),
            }
        });
    }

    pub fn option_mut(&mut self, value: &str, languages: &[String]) -> &mut DropdownOption {
        let idx = match self.options.iter().position(|o| o.value == value) {
            Some(idx) => idx,
            None => {
                self.options.push(DropdownOption {
                    value: value.to_string(),
                    text: LocalizedText::empty_for(languages),
                });
                self.options.len() - 1
            }
        };
        &mut self.options[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_round_trip_names() {
        assert_eq!(
            ComponentType::from("dropdown_container"),
            ComponentType::DropdownContainer
        );
        assert_eq!(ComponentType::from("select"), ComponentType::Dropdown);
        assert_eq!(
            ComponentType::from("hint"),
            ComponentType::Other("hint".to_string())
        );
        assert_eq!(ComponentType::from("hint").as_str(), "hint");
        assert!(ComponentType::Placeholder.is_dropdown_part());
        assert!(!ComponentType::Text.is_dropdown_part());
    }

    #[test]
    fn test_localized_text_fallback() {
        let mut text = LocalizedText::default();
        text.set("en", "Property Type");
        text.set("he", "");
        assert_eq!(text.resolve("he"), "Property Type");
        assert_eq!(text.resolve("ru"), "Property Type");
        text.set("ru", "Тип недвижимости");
        assert_eq!(text.resolve("ru"), "Тип недвижимости");
        assert_eq!(LocalizedText::default().resolve("en"), "");
    }

    #[test]
    fn test_dropdown_data_parses_without_metadata() {
        let raw = serde_json::json!({
            "label": {"en": "Loan Term", "he": "תקופת ההלוואה"},
            "placeholder": {"en": "Select loan term"},
            "options": [
                {"value": "30", "text": {"en": "30 years"}},
                {"value": "10", "text": {"en": "10 years"}}
            ]
        });
        let mut data: DropdownData = serde_json::from_value(raw).unwrap();
        assert!(data.metadata.is_none());
        data.sort_options();
        assert_eq!(data.options[0].value, "10");
        assert_eq!(data.options[1].value, "30");
    }

    #[test]
    fn test_sort_options_mixed_values() {
        let mut data = DropdownData::default();
        let langs = vec!["en".to_string()];
        data.option_mut("apartment", &langs);
        data.option_mut("2", &langs);
        data.option_mut("1", &langs);
        data.option_mut("2", &langs);
        data.sort_options();
        let values: Vec<_> = data.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["1", "2", "apartment"]);
    }
}
