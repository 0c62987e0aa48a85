//! Field-name inference from content keys.
//!
//! Content keys follow several naming conventions that drifted over time:
//!
//! - `{screen}.field.{field}` with an option suffix, e.g.
//!   `mortgage_step3.field.additional_income_0_no_additional_income` or
//!   `mortgage_step2.field.family_status_married`
//! - `{service}_step{N}_{field}[_ph|_option_{N}]`
//! - `calculate_mortgage_{field}[_ph|_option_{N}]`
//!
//! The patterns are tried in a fixed order and the first match wins. The
//! `dropdown_configs` JSONB table stores the field name explicitly, so this
//! module is only needed to migrate legacy rows into it.

use crate::models::ComponentType;
use regex::Regex;
use std::sync::OnceLock;

/// Enum values that appear as the tail of a `.field.` option key.
const OPTION_VALUE_SUFFIXES: &str = "has_property|no_property|selling_property|within_3_months|\
3_to_6_months|6_to_12_months|over_12_months|apartment|garden_apartment|penthouse|private_house|\
other|yes_first_home|no_additional_property|investment|fixed_rate|variable_rate|mixed_rate|\
not_sure|im_|i_no_|i_own_|selling_|no_|has_|single|married|divorced|widowed|partner|\
commonlaw_partner|no_high_school_diploma|partial_high_school_diploma|full_high_school_diploma|\
postsecondary_education|bachelors|masters|doctorate|employee|selfemployed|pension|student|\
unemployed|unpaid_leave|additional_salary|additional_work|property_rental_income|\
no_additional_income|bank_loan|consumer_credit|credit_card|no_obligations|hapoalim|leumi|\
discount|massad|mizrahi";

/// "Field of activity" option values.
const ACTIVITY_SUFFIXES: &str = "agriculture|technology|healthcare|education|finance|\
real_estate|construction|retail|manufacturing|government|transport|consulting|entertainment|other";

/// Legacy option keys without `_option_N`; position + 1 is the option number.
const LEGACY_OPTION_SUFFIXES: [&str; 12] = [
    "no_property",
    "has_property",
    "selling_property",
    "single",
    "married",
    "divorced",
    "widowed",
    "employee",
    "selfemployed",
    "pension",
    "student",
    "unemployed",
];

struct KeyPatterns {
    sentinel_option: Regex,
    enum_suffix: Regex,
    activity_suffix: Regex,
    field_option_or_placeholder: Regex,
    field_tail: Regex,
    step_placeholder: Regex,
    step_option: Regex,
    step_field: Regex,
    calculator_placeholder: Regex,
    calculator_option: Regex,
    calculator_field: Regex,
    option_number: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in key pattern {pattern}: {e}"))
}

fn patterns() -> &'static KeyPatterns {
    static PATTERNS: OnceLock<KeyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| KeyPatterns {
        sentinel_option: compile(
            r"^[^.]*\.field\.([^.]+?)_([0-9])_(?:no_additional_income|no_obligations)",
        ),
        enum_suffix: compile(&format!(
            r"^[^.]*\.field\.([^.]+)_(?:{})",
            OPTION_VALUE_SUFFIXES
        )),
        activity_suffix: compile(&format!(
            r"^[^.]*\.field\.([^.]+?)_(?:{})",
            ACTIVITY_SUFFIXES
        )),
        field_option_or_placeholder: compile(r"^.*\.field\.([^.]+?)_(?:options?_\d+|ph)$"),
        field_tail: compile(r"^.*\.field\.([^.]+)"),
        step_placeholder: compile(r"^[^_]+_step\d+_([^_]+(?:_[^_]+)*)_(?:options_)?ph$"),
        step_option: compile(r"^[^_]+_step\d+_([^_]+(?:_[^_]+)*)_(?:option|options)_\d+$"),
        step_field: compile(r"^[^_]+_step\d+_([^_]+(?:_[^_]+)*)$"),
        calculator_placeholder: compile(r"calculate_mortgage_([^_]+(?:_[^_]+)*)_ph$"),
        calculator_option: compile(r"calculate_mortgage_([^_]+(?:_[^_]+)*)_option_\d+$"),
        calculator_field: compile(r"calculate_mortgage_([^_]+(?:_[^_]+)*)$"),
        option_number: compile(r"_options?_(\d+)"),
    })
}

fn capture(re: &Regex, key: &str) -> Option<String> {
    re.captures(key)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Infers the dropdown field a content key belongs to.
///
/// Returns `None` when no convention matches.
pub fn extract_field_name(content_key: &str) -> Option<String> {
    let p = patterns();
    let key = content_key.trim();

    if key.contains(".field.") {
        return capture(&p.sentinel_option, key)
            .or_else(|| capture(&p.enum_suffix, key))
            .or_else(|| capture(&p.activity_suffix, key))
            .or_else(|| capture(&p.field_option_or_placeholder, key))
            .or_else(|| capture(&p.field_tail, key));
    }

    if let Some(field) = capture(&p.step_placeholder, key) {
        return Some(field);
    }
    if key.contains("_option_") || key.contains("_options_") {
        if let Some(field) = capture(&p.step_option, key) {
            return Some(field);
        }
    }
    if let Some(field) = capture(&p.step_field, key) {
        return Some(field);
    }

    if key.contains("_ph") {
        if let Some(field) = capture(&p.calculator_placeholder, key) {
            return Some(field);
        }
    }
    if key.contains("_option_") {
        if let Some(field) = capture(&p.calculator_option, key) {
            return Some(field);
        }
    }
    capture(&p.calculator_field, key)
}

/// Option number of an option key.
///
/// Explicit `_option_N` wins; numbered sentinels (`_0_no_obligations`) use
/// their digit; legacy keys map their value suffix to a fixed position.
pub fn option_number(content_key: &str) -> Option<u32> {
    let p = patterns();

    if let Some(n) = p
        .option_number
        .captures(content_key)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Some(n);
    }

    if let Some(n) = p
        .sentinel_option
        .captures(content_key)
        .and_then(|c| c.get(2))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Some(n);
    }

    LEGACY_OPTION_SUFFIXES
        .iter()
        .position(|suffix| content_key.contains(suffix))
        .map(|idx| idx as u32 + 1)
}

/// What a content row contributes to its dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Label,
    Placeholder,
    Option,
    Ignored,
}

/// Decides the role of a row from its key and component type.
///
/// Label and container rows whose key looks like an option or placeholder are
/// ignored rather than reinterpreted.
pub fn classify(content_key: &str, component_type: &str) -> KeyRole {
    let component = ComponentType::from(component_type);
    let looks_like_option = content_key.contains("_option_");
    let looks_like_placeholder = content_key.contains("_ph");

    match component {
        ComponentType::Label | ComponentType::DropdownContainer => {
            if looks_like_option || looks_like_placeholder {
                KeyRole::Ignored
            } else {
                KeyRole::Label
            }
        }
        ComponentType::Placeholder => KeyRole::Placeholder,
        _ if looks_like_placeholder => KeyRole::Placeholder,
        ref c if c.is_option() || looks_like_option => KeyRole::Option,
        _ => KeyRole::Ignored,
    }
}

/// The `value` an option key gets inside its dropdown.
///
/// Numbered keys use their number. Otherwise the tail after `{field}_` is
/// used, so `education_bachelors` under `education` becomes `bachelors`.
pub fn option_value(content_key: &str, field_name: &str) -> Option<String> {
    if let Some(n) = option_number(content_key) {
        return Some(n.to_string());
    }
    let marker = format!("{}_", field_name);
    content_key
        .rfind(&marker)
        .map(|idx| &content_key[idx + marker.len()..])
        .filter(|tail| !tail.is_empty())
        .map(str::to_string)
}

/// The `{screen}_{field}` composite used as `dropdown_key` and API key.
pub fn dropdown_key(screen_location: &str, field_name: &str) -> String {
    format!("{}_{}", screen_location, field_name)
}
