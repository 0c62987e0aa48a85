use crate::field_name::{classify, dropdown_key, extract_field_name, option_value, KeyRole};
use crate::models::{
    DropdownConfig, DropdownData, DropdownMetadata, DropdownSourceRow, LocalizedText,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::collections::{BTreeMap, BTreeSet};

/// A dropdown assembled from legacy content rows, ready to upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownConfigDraft {
    pub dropdown_key: String,
    pub screen_location: String,
    pub field_name: String,
    pub data: DropdownData,
}

impl DropdownConfigDraft {
    /// The draft as an active, not yet stored config row.
    pub fn into_config(self) -> DropdownConfig {
        DropdownConfig {
            id: 0,
            dropdown_key: self.dropdown_key,
            screen_location: self.screen_location,
            field_name: self.field_name,
            dropdown_data: Json(self.data),
            is_active: true,
        }
    }

    /// Compares the draft with the option count of its stored config, if any.
    pub fn state(&self, stored_options: Option<usize>) -> ConfigState {
        match stored_options {
            None => ConfigState::Missing,
            Some(stored) if stored != self.data.options.len() => ConfigState::Stale { stored },
            Some(_) => ConfigState::Current,
        }
    }
}

/// How a draft relates to what `dropdown_configs` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    Missing,
    Stale { stored: usize },
    Current,
}

#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Drafts ordered by `dropdown_key`.
    pub drafts: Vec<DropdownConfigDraft>,
    /// Keys that could not be placed into any dropdown.
    pub skipped_keys: Vec<String>,
}

/// Groups approved dropdown rows into one JSONB config per `{screen}_{field}`.
///
/// Every draft starts with an empty string for each configured language so
/// the stored document has a stable shape.
pub fn build_dropdown_configs(
    rows: &[DropdownSourceRow],
    languages: &[String],
    source: &str,
    now: DateTime<Utc>,
) -> BuildOutcome {
    let mut drafts: BTreeMap<String, DropdownConfigDraft> = BTreeMap::new();
    let mut skipped: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        let Some(field_name) = extract_field_name(&row.content_key) else {
            skipped.insert(row.content_key.clone());
            continue;
        };

        let key = dropdown_key(&row.screen_location, &field_name);
        let draft = drafts.entry(key.clone()).or_insert_with(|| DropdownConfigDraft {
            dropdown_key: key,
            screen_location: row.screen_location.clone(),
            field_name: field_name.clone(),
            data: DropdownData {
                label: LocalizedText::empty_for(languages),
                placeholder: LocalizedText::empty_for(languages),
                options: Vec::new(),
                metadata: Some(DropdownMetadata {
                    created_at: Some(now),
                    source: Some(source.to_string()),
                    original_keys: Vec::new(),
                }),
            },
        });

        if let Some(meta) = draft.data.metadata.as_mut() {
            if !meta.original_keys.contains(&row.content_key) {
                meta.original_keys.push(row.content_key.clone());
            }
        }

        let text = row.content_value.clone().unwrap_or_default();
        match classify(&row.content_key, &row.component_type) {
            KeyRole::Label => draft.data.label.set(&row.language_code, text),
            KeyRole::Placeholder => draft.data.placeholder.set(&row.language_code, text),
            KeyRole::Option => match option_value(&row.content_key, &field_name) {
                Some(value) => draft
                    .data
                    .option_mut(&value, languages)
                    .text
                    .set(&row.language_code, text),
                None => {
                    skipped.insert(row.content_key.clone());
                }
            },
            KeyRole::Ignored => {}
        }
    }

    let drafts = drafts
        .into_values()
        .map(|mut draft| {
            draft.data.sort_options();
            draft
        })
        .collect();

    BuildOutcome {
        drafts,
        skipped_keys: skipped.into_iter().collect(),
    }
}
