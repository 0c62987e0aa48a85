//! Comparison of stored content with what the content API serves.

use crate::dropdown_api::{ContentResponse, DropdownsResponse};
use crate::models::DropdownConfig;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    MissingLabel { dropdown_key: String },
    MissingOptions { dropdown_key: String },
    OptionCountMismatch {
        dropdown_key: String,
        stored: usize,
        served: usize,
    },
    EmptyOptionText { dropdown_key: String, value: String },
    MissingContentKey { content_key: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingLabel { dropdown_key } => {
                write!(f, "{}: no entry in labels", dropdown_key)
            }
            Issue::MissingOptions { dropdown_key } => {
                write!(f, "{}: no option list", dropdown_key)
            }
            Issue::OptionCountMismatch {
                dropdown_key,
                stored,
                served,
            } => write!(
                f,
                "{}: {} options stored, {} served",
                dropdown_key, stored, served
            ),
            Issue::EmptyOptionText {
                dropdown_key,
                value,
            } => write!(f, "{}: option {} has empty text", dropdown_key, value),
            Issue::MissingContentKey { content_key } => {
                write!(f, "{}: missing from content response", content_key)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub screen_location: String,
    pub language_code: String,
    pub checked: usize,
    pub issues: Vec<Issue>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Checks every stored dropdown against a `/api/dropdowns` response.
pub fn verify_dropdowns(
    configs: &[DropdownConfig],
    response: &DropdownsResponse,
) -> VerificationReport {
    let mut report = VerificationReport {
        screen_location: response.screen_location.clone(),
        language_code: response.language_code.clone(),
        checked: configs.len(),
        issues: Vec::new(),
    };

    for config in configs {
        let key = &config.dropdown_key;
        if !response.labels.contains_key(key) {
            report.issues.push(Issue::MissingLabel {
                dropdown_key: key.clone(),
            });
        }

        let stored = config.dropdown_data.0.options.len();
        if stored == 0 {
            continue;
        }
        let Some(served) = response.option_list(key) else {
            report.issues.push(Issue::MissingOptions {
                dropdown_key: key.clone(),
            });
            continue;
        };

        if served.len() != stored {
            report.issues.push(Issue::OptionCountMismatch {
                dropdown_key: key.clone(),
                stored,
                served: served.len(),
            });
        }
        for option in served.iter().filter(|o| o.text.trim().is_empty()) {
            report.issues.push(Issue::EmptyOptionText {
                dropdown_key: key.clone(),
                value: option.value.clone(),
            });
        }
    }

    report
}

/// Checks that every expected key is present in a `/api/content` response.
pub fn verify_content<S: AsRef<str>>(
    expected_keys: &[S],
    response: &ContentResponse,
) -> VerificationReport {
    let issues = expected_keys
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| !response.content.contains_key(*key))
        .map(|key| Issue::MissingContentKey {
            content_key: key.to_string(),
        })
        .collect();

    VerificationReport {
        screen_location: response.screen_location.clone(),
        language_code: response.language_code.clone(),
        checked: expected_keys.len(),
        issues,
    }
}
