//! Content database audit: report rows, derived statistics and text tables.

use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComponentTypeCount {
    pub screen_location: String,
    pub component_type: String,
    pub item_count: i64,
    pub unique_keys: i64,
}

/// A content key present more than once, across or within screens.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DuplicateKey {
    pub content_key: String,
    pub occurrences: i64,
    pub screens: Vec<String>,
    pub component_types: Vec<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScreenCoverageRow {
    pub screen_location: String,
    pub total_items: i64,
    pub complete_items: i64,
    pub complete_coverage_percent: Option<BigDecimal>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LanguageCount {
    pub screen_location: String,
    pub language_code: String,
    pub translated_items: i64,
}

/// Coverage of one screen: complete items plus per-language counts.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenCoverage {
    pub screen_location: String,
    pub total_items: i64,
    pub complete_items: i64,
    pub complete_coverage_percent: BigDecimal,
    pub per_language: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MissingTranslation {
    pub screen_location: String,
    pub content_key: String,
    pub component_type: String,
    pub translation_count: i64,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContainerWithoutOptions {
    pub screen_location: String,
    pub containers: i64,
    pub options: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OptionTypeUsage {
    pub screen_location: String,
    pub component_type: String,
    pub item_count: i64,
    pub sample_keys: Vec<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScreenComponentCount {
    pub screen_location: String,
    pub component_type: String,
    pub item_count: i64,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct SummaryStats {
    pub total_content_items: i64,
    pub unique_content_keys: i64,
    pub total_screens: i64,
    pub total_component_types: i64,
    pub total_translations: i64,
    pub supported_languages: i64,
}

impl SummaryStats {
    pub fn duplication_rate(&self) -> f64 {
        duplication_rate(self.total_content_items, self.unique_content_keys)
    }
}

/// Percentage of items whose key repeats another item's key, one decimal.
pub fn duplication_rate(total_items: i64, unique_keys: i64) -> f64 {
    if total_items <= 0 {
        return 0.0;
    }
    let duplicates = (total_items - unique_keys).max(0) as f64;
    (duplicates / total_items as f64 * 1000.0).round() / 10.0
}

/// Naming convention a content key follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum KeyPattern {
    AppDotted,
    ScreenField,
    DropdownOption,
    Placeholder,
    Label,
    ValidationError,
    Other,
}

impl KeyPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPattern::AppDotted => "app.service.step.field",
            KeyPattern::ScreenField => "screen_field_format",
            KeyPattern::DropdownOption => "dropdown_option",
            KeyPattern::Placeholder => "placeholder",
            KeyPattern::Label => "label",
            KeyPattern::ValidationError => "validation_error",
            KeyPattern::Other => "other_pattern",
        }
    }
}

/// Classifies a key; the first matching convention wins.
pub fn classify_key_pattern(content_key: &str) -> KeyPattern {
    if content_key.starts_with("app.") {
        KeyPattern::AppDotted
    } else if has_step_segment(content_key) {
        KeyPattern::ScreenField
    } else if content_key.contains("option_") {
        KeyPattern::DropdownOption
    } else if content_key.ends_with("_ph") {
        KeyPattern::Placeholder
    } else if content_key.ends_with("_label") {
        KeyPattern::Label
    } else if content_key.starts_with("error_") {
        KeyPattern::ValidationError
    } else {
        KeyPattern::Other
    }
}

/// `_step` followed later by another `_`.
fn has_step_segment(key: &str) -> bool {
    key.find("_step")
        .map(|idx| key[idx + "_step".len()..].contains('_'))
        .unwrap_or(false)
}

/// Product area a screen belongs to.
pub fn screen_context(screen_location: &str) -> &'static str {
    const PREFIXES: [(&str, &str); 7] = [
        ("mortgage_", "mortgage"),
        ("credit_", "credit"),
        ("refinance_", "refinance"),
        ("other_", "other_borrowers"),
        ("admin_", "admin"),
        ("cms_", "cms"),
        ("bank_", "bank_ops"),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| screen_location.starts_with(prefix))
        .map(|(_, context)| *context)
        .unwrap_or("other")
}

/// Count and share (one decimal percent) of each key pattern, most common first.
pub fn pattern_distribution<'a, I>(keys: I) -> Vec<(KeyPattern, usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<KeyPattern, usize> = BTreeMap::new();
    let mut total = 0usize;
    for key in keys {
        *counts.entry(classify_key_pattern(key)).or_default() += 1;
        total += 1;
    }
    let mut rows: Vec<_> = counts
        .into_iter()
        .map(|(pattern, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                (count as f64 * 1000.0 / total as f64).round() / 10.0
            };
            (pattern, count, pct)
        })
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    rows
}

/// Item counts per (context, component type).
pub fn context_distribution(rows: &[ScreenComponentCount]) -> BTreeMap<(String, String), i64> {
    let mut out = BTreeMap::new();
    for row in rows {
        *out.entry((
            screen_context(&row.screen_location).to_string(),
            row.component_type.clone(),
        ))
        .or_insert(0) += row.item_count;
    }
    out
}

/// Joins coverage rows with per-language counts.
pub fn merge_coverage(rows: Vec<ScreenCoverageRow>, counts: &[LanguageCount]) -> Vec<ScreenCoverage> {
    rows.into_iter()
        .map(|row| {
            let per_language = counts
                .iter()
                .filter(|c| c.screen_location == row.screen_location)
                .map(|c| (c.language_code.clone(), c.translated_items))
                .collect();
            ScreenCoverage {
                screen_location: row.screen_location,
                total_items: row.total_items,
                complete_items: row.complete_items,
                complete_coverage_percent: row
                    .complete_coverage_percent
                    .unwrap_or_else(|| BigDecimal::from(0)),
                per_language,
            }
        })
        .collect()
}

/// Renders rows as a `|`-separated table; column widths fit the content.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths[i].saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(headers.to_vec()));
    let total_width = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "{}", "-".repeat(total_width));
    for row in rows {
        let cells: Vec<&str> = (0..headers.len())
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        let _ = writeln!(out, "{}", line(cells));
    }
    out
}

/// Truncates to `max` characters, marking the cut with `…`.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut s: String = value.chars().take(max.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}
