//! Response shapes of the content API (`/api/dropdowns` and `/api/content`).
//!
//! The same types are serialized by the server handlers and deserialized by
//! [`crate::content_client::ContentApiClient`].

use crate::dropdown_builder::DropdownConfigDraft;
use crate::models::{DropdownConfig, ScreenContentRow};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// `performance.source` of responses built from `dropdown_configs`.
pub const JSONB_SOURCE: &str = "dropdown_configs";
/// `performance.source` of responses built from the legacy content rows.
pub const LEGACY_SOURCE: &str = "content_items_translations";

/// Top-level keys a per-field entry must never overwrite.
const RESERVED_KEYS: [&str; 10] = [
    "status",
    "screen_location",
    "language_code",
    "dropdowns",
    "options",
    "placeholders",
    "labels",
    "cached",
    "jsonb_source",
    "performance",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOption {
    pub value: String,
    #[serde(default)]
    pub text: String,
}

/// `options` holds both per-dropdown lists and flat `{key}_option_{value}` texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionsEntry {
    List(Vec<ApiOption>),
    Text(String),
}

impl OptionsEntry {
    pub fn as_list(&self) -> Option<&[ApiOption]> {
        match self {
            OptionsEntry::List(list) => Some(list),
            OptionsEntry::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownSummary {
    pub key: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    #[serde(default)]
    pub query_count: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub total_items: usize,
    #[serde(default)]
    pub dropdowns_found: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub screen_location: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub dropdowns: Vec<DropdownSummary>,
    #[serde(default)]
    pub options: BTreeMap<String, OptionsEntry>,
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub jsonb_source: bool,
    #[serde(default)]
    pub performance: Option<Performance>,
    /// Per-field objects (`{label, placeholder, options}`) keyed by field name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl DropdownsResponse {
    pub fn option_list(&self, dropdown_key: &str) -> Option<&[ApiOption]> {
        self.options.get(dropdown_key).and_then(OptionsEntry::as_list)
    }
}

/// Shapes the dropdown configs of one screen into the API response for `language`.
///
/// Texts fall back to English, then to an empty string. Configs are expected in
/// `dropdown_key` order; a later config with the same field name replaces the
/// per-field entry of an earlier one.
pub fn build_dropdowns_response(
    screen: &str,
    language: &str,
    configs: &[DropdownConfig],
) -> DropdownsResponse {
    let mut response = DropdownsResponse {
        status: "success".to_string(),
        screen_location: screen.to_string(),
        language_code: language.to_string(),
        jsonb_source: true,
        ..Default::default()
    };

    // field name -> (dropdown key, label, placeholder, options), first-seen order
    let mut by_field: Vec<(String, String, String, String, Vec<ApiOption>)> = Vec::new();

    for config in configs {
        let data = &config.dropdown_data.0;
        let label = data.label.resolve(language).to_string();
        let placeholder = data.placeholder.resolve(language).to_string();
        let options: Vec<ApiOption> = data
            .options
            .iter()
            .map(|opt| ApiOption {
                value: opt.value.clone(),
                text: opt.text.resolve(language).to_string(),
            })
            .collect();

        response
            .labels
            .insert(config.dropdown_key.clone(), label.clone());
        response
            .placeholders
            .insert(config.dropdown_key.clone(), placeholder.clone());
        for opt in &options {
            response.options.insert(
                format!("{}_option_{}", config.dropdown_key, opt.value),
                OptionsEntry::Text(opt.text.clone()),
            );
        }

        let entry = (
            config.field_name.clone(),
            config.dropdown_key.clone(),
            label,
            placeholder,
            options,
        );
        match by_field.iter_mut().find(|e| e.0 == config.field_name) {
            Some(existing) => *existing = entry,
            None => by_field.push(entry),
        }
    }

    for (field_name, key, label, placeholder, options) in by_field {
        let summary_label = if label.is_empty() {
            field_name.replace('_', " ")
        } else {
            label.clone()
        };
        response.dropdowns.push(DropdownSummary {
            key: key.clone(),
            label: summary_label,
        });

        if !options.is_empty() {
            response
                .options
                .insert(key.clone(), OptionsEntry::List(options.clone()));
        }

        if !RESERVED_KEYS.contains(&field_name.as_str()) && !response.fields.contains_key(&field_name)
        {
            response.fields.insert(
                field_name,
                json!({
                    "label": label,
                    "placeholder": placeholder,
                    "options": options,
                }),
            );
        }
    }

    apply_aliases(&mut response, screen);

    response.performance = Some(Performance {
        query_count: 1,
        source: JSONB_SOURCE.to_string(),
        total_items: configs.len(),
        dropdowns_found: response.dropdowns.len(),
    });

    response
}

/// Shapes drafts built from legacy content rows into the same response, for
/// databases that have no `dropdown_configs` yet.
pub fn build_legacy_dropdowns_response(
    screen: &str,
    language: &str,
    drafts: Vec<DropdownConfigDraft>,
) -> DropdownsResponse {
    let configs: Vec<DropdownConfig> = drafts
        .into_iter()
        .map(DropdownConfigDraft::into_config)
        .collect();
    let mut response = build_dropdowns_response(screen, language, &configs);
    response.jsonb_source = false;
    if let Some(performance) = response.performance.as_mut() {
        performance.source = LEGACY_SOURCE.to_string();
    }
    response
}

/// Copies `{screen}_{source}` under `{screen}_{alias}` when only the source exists.
///
/// The summary label is the copied label, or `fallback_label` when that is empty.
fn copy_alias(
    response: &mut DropdownsResponse,
    screen: &str,
    source: &str,
    alias: &str,
    fallback_label: &str,
) -> bool {
    let source_key = format!("{}_{}", screen, source);
    let alias_key = format!("{}_{}", screen, alias);

    let Some(options) = response.options.get(&source_key).cloned() else {
        return false;
    };
    if response.options.contains_key(&alias_key) {
        return false;
    }

    response.options.insert(alias_key.clone(), options);
    if let Some(label) = response.labels.get(&source_key).cloned() {
        response.labels.insert(alias_key.clone(), label);
    }
    if let Some(placeholder) = response.placeholders.get(&source_key).cloned() {
        response.placeholders.insert(alias_key.clone(), placeholder);
    }

    let label = response
        .labels
        .get(&alias_key)
        .filter(|l| !l.is_empty())
        .cloned()
        .unwrap_or_else(|| fallback_label.to_string());
    response.dropdowns.push(DropdownSummary {
        key: alias_key,
        label,
    });
    true
}

/// Screen-specific key aliases kept for older frontend builds.
fn apply_aliases(response: &mut DropdownsResponse, screen: &str) {
    match screen {
        "mortgage_step2" => {
            copy_alias(
                response,
                screen,
                "citizenship",
                "citizenship_countries",
                "Citizenship Countries",
            );
        }
        "mortgage_step1" => {
            for (source, alias) in [("when", "when_needed"), ("first", "first_home")] {
                if !copy_alias(response, screen, source, alias, &alias.replace('_', " ")) {
                    copy_alias(response, screen, alias, source, &source.replace('_', " "));
                }
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub component_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub screen_location: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub content_count: usize,
    #[serde(default)]
    pub content: BTreeMap<String, ContentEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_by_type: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

/// Shapes approved screen content into the `/api/content` response.
pub fn build_content_response(
    screen: &str,
    language: &str,
    rows: &[ScreenContentRow],
    type_filter: Option<&str>,
) -> ContentResponse {
    let content = rows
        .iter()
        .map(|row| {
            (
                row.content_key.clone(),
                ContentEntry {
                    value: row.content_value.clone().unwrap_or_default(),
                    component_type: row.component_type.clone(),
                    category: row.category.clone(),
                    language: row.language_code.clone(),
                    status: row.status.clone(),
                },
            )
        })
        .collect();

    ContentResponse {
        status: "success".to_string(),
        screen_location: screen.to_string(),
        language_code: language.to_string(),
        content_count: rows.len(),
        content,
        filtered_by_type: type_filter.map(str::to_string),
        cached: false,
    }
}
