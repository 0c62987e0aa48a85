/// Dropdown assembly from legacy rows, API shaping and verification
use chrono::{TimeZone, Utc};
use content_doctor::api::dropdown_api::{
    build_content_response, build_dropdowns_response, build_legacy_dropdowns_response, OptionsEntry,
};
use content_doctor::dropdown_builder::{build_dropdown_configs, ConfigState};
use content_doctor::models::{
    DropdownConfig, DropdownData, DropdownOption, DropdownSourceRow, LocalizedText,
    ScreenContentRow,
};
use content_doctor::verification::{verify_content, verify_dropdowns, Issue};
use sqlx::types::Json;

fn languages() -> Vec<String> {
    vec!["en".to_string(), "he".to_string(), "ru".to_string()]
}

fn row(key: &str, component_type: &str, language: &str, value: &str) -> DropdownSourceRow {
    DropdownSourceRow {
        content_key: key.to_string(),
        component_type: component_type.to_string(),
        language_code: language.to_string(),
        content_value: Some(value.to_string()),
        screen_location: "mortgage_step1".to_string(),
    }
}

fn text(pairs: &[(&str, &str)]) -> LocalizedText {
    let mut t = LocalizedText::empty_for(&languages());
    for (lang, value) in pairs {
        t.set(lang, *value);
    }
    t
}

fn config(screen: &str, field: &str, label: &[(&str, &str)], options: &[(&str, &str)]) -> DropdownConfig {
    DropdownConfig {
        id: 1,
        dropdown_key: format!("{}_{}", screen, field),
        screen_location: screen.to_string(),
        field_name: field.to_string(),
        dropdown_data: Json(DropdownData {
            label: text(label),
            placeholder: text(&[("en", "Select an option")]),
            options: options
                .iter()
                .map(|(value, en)| DropdownOption {
                    value: value.to_string(),
                    text: text(&[("en", en)]),
                })
                .collect(),
            metadata: None,
        }),
        is_active: true,
    }
}

fn ownership_rows() -> Vec<DropdownSourceRow> {
    vec![
        row("mortgage_step1.field.property_ownership", "dropdown_container", "en", "Property ownership"),
        row("mortgage_step1.field.property_ownership", "dropdown_container", "he", "בעלות על נכס"),
        row("mortgage_step1.field.property_ownership_ph", "placeholder", "en", "Select status"),
        row("mortgage_step1.field.property_ownership_option_2", "dropdown_option", "en", "I own a property"),
        row("mortgage_step1.field.property_ownership_option_10", "dropdown_option", "en", "Other"),
        row("mortgage_step1.field.property_ownership_option_1", "dropdown_option", "en", "No property"),
        row("mortgage_step1.field.property_ownership_option_1", "dropdown_option", "ru", "Нет недвижимости"),
        row("legacy_unmapped_key", "option", "en", "Orphan"),
    ]
}

#[test]
fn test_build_groups_rows_into_one_config() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let outcome = build_dropdown_configs(&ownership_rows(), &languages(), "test", now);

    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.skipped_keys, vec!["legacy_unmapped_key".to_string()]);

    let draft = &outcome.drafts[0];
    assert_eq!(draft.dropdown_key, "mortgage_step1_property_ownership");
    assert_eq!(draft.field_name, "property_ownership");
    assert_eq!(draft.data.label.get("en"), Some("Property ownership"));
    assert_eq!(draft.data.label.get("he"), Some("בעלות על נכס"));
    assert_eq!(draft.data.label.get("ru"), Some(""));
    assert_eq!(draft.data.placeholder.get("en"), Some("Select status"));

    let values: Vec<&str> = draft.data.options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["1", "2", "10"]);
    assert_eq!(draft.data.options[0].text.get("ru"), Some("Нет недвижимости"));

    let meta = draft.data.metadata.as_ref().unwrap();
    assert_eq!(meta.created_at, Some(now));
    assert_eq!(meta.source.as_deref(), Some("test"));
    // the container key appears once despite two languages
    assert_eq!(meta.original_keys.len(), 5);
}

#[test]
fn test_build_separates_fields_and_screens() {
    let mut rows = ownership_rows();
    rows.push(row("mortgage_step1.field.city", "label", "en", "City"));
    let mut other_screen = row("mortgage_step2.field.city", "label", "en", "City");
    other_screen.screen_location = "mortgage_step2".to_string();
    rows.push(other_screen);

    let outcome = build_dropdown_configs(&rows, &languages(), "test", Utc::now());
    let keys: Vec<&str> = outcome.drafts.iter().map(|d| d.dropdown_key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "mortgage_step1_city",
            "mortgage_step1_property_ownership",
            "mortgage_step2_city"
        ]
    );
}

#[test]
fn test_dropdowns_response_shape() {
    let configs = vec![config(
        "mortgage_step1",
        "property_ownership",
        &[("en", "Property ownership"), ("he", "בעלות על נכס")],
        &[("1", "No property"), ("2", "I own a property")],
    )];
    let response = build_dropdowns_response("mortgage_step1", "he", &configs);

    assert_eq!(response.status, "success");
    assert!(response.jsonb_source);
    assert!(!response.cached);
    let key = "mortgage_step1_property_ownership";
    assert_eq!(response.labels[key], "בעלות על נכס");
    // Hebrew placeholder is empty, English is served
    assert_eq!(response.placeholders[key], "Select an option");
    assert_eq!(
        response.options["mortgage_step1_property_ownership_option_2"],
        OptionsEntry::Text("I own a property".to_string())
    );

    let list = response.option_list(key).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].value, "1");

    assert_eq!(response.dropdowns.len(), 1);
    assert_eq!(response.dropdowns[0].label, "בעלות על נכס");
    assert_eq!(response.fields["property_ownership"]["label"], "בעלות על נכס");

    let perf = response.performance.as_ref().unwrap();
    assert_eq!(perf.source, "dropdown_configs");
    assert_eq!(perf.dropdowns_found, 1);

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["property_ownership"]["options"][1]["value"], "2");
}

#[test]
fn test_dropdown_label_falls_back_to_field_name() {
    let configs = vec![config("credit_step1", "loan_purpose", &[], &[("1", "Car")])];
    let response = build_dropdowns_response("credit_step1", "en", &configs);
    assert_eq!(response.dropdowns[0].label, "loan purpose");
    assert_eq!(response.labels["credit_step1_loan_purpose"], "");
}

#[test]
fn test_reserved_field_names_do_not_overwrite_top_level() {
    let configs = vec![config("mortgage_step1", "status", &[("en", "Status")], &[("1", "A")])];
    let response = build_dropdowns_response("mortgage_step1", "en", &configs);
    assert!(!response.fields.contains_key("status"));
    assert_eq!(response.status, "success");
}

#[test]
fn test_mortgage_step1_aliases_both_directions() {
    let configs = vec![
        config("mortgage_step1", "first_home", &[("en", "First home?")], &[("1", "Yes")]),
        config("mortgage_step1", "when", &[("en", "When?")], &[("1", "Soon")]),
    ];
    let response = build_dropdowns_response("mortgage_step1", "en", &configs);

    assert!(response.option_list("mortgage_step1_when_needed").is_some());
    assert!(response.option_list("mortgage_step1_first").is_some());
    assert_eq!(response.labels["mortgage_step1_when_needed"], "When?");
    let keys: Vec<&str> = response.dropdowns.iter().map(|d| d.key.as_str()).collect();
    assert!(keys.contains(&"mortgage_step1_first"));
    assert!(keys.contains(&"mortgage_step1_when_needed"));
}

#[test]
fn test_aliases_do_not_replace_existing_keys() {
    let configs = vec![
        config("mortgage_step1", "when", &[("en", "When?")], &[("1", "Soon")]),
        config("mortgage_step1", "when_needed", &[("en", "Needed by")], &[("1", "A"), ("2", "B")]),
    ];
    let response = build_dropdowns_response("mortgage_step1", "en", &configs);
    assert_eq!(response.option_list("mortgage_step1_when_needed").unwrap().len(), 2);
    assert_eq!(response.dropdowns.len(), 2);
}

#[test]
fn test_citizenship_alias_only_on_step2() {
    let step2 = vec![config("mortgage_step2", "citizenship", &[("en", "Citizenship")], &[("1", "Israel")])];
    let response = build_dropdowns_response("mortgage_step2", "en", &step2);
    assert!(response.option_list("mortgage_step2_citizenship_countries").is_some());

    let step3 = vec![config("mortgage_step3", "citizenship", &[("en", "Citizenship")], &[("1", "Israel")])];
    let response = build_dropdowns_response("mortgage_step3", "en", &step3);
    assert!(response.option_list("mortgage_step3_citizenship_countries").is_none());
}

#[test]
fn test_citizenship_alias_label_without_stored_label() {
    let step2 = vec![config("mortgage_step2", "citizenship", &[], &[("1", "Israel")])];
    let response = build_dropdowns_response("mortgage_step2", "en", &step2);
    let alias = response
        .dropdowns
        .iter()
        .find(|d| d.key == "mortgage_step2_citizenship_countries")
        .unwrap();
    assert_eq!(alias.label, "Citizenship Countries");
}

#[test]
fn test_legacy_response_matches_jsonb_shape() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let outcome = build_dropdown_configs(&ownership_rows(), &languages(), "legacy", now);
    let configs: Vec<DropdownConfig> = outcome
        .drafts
        .iter()
        .cloned()
        .map(|draft| draft.into_config())
        .collect();
    let jsonb = build_dropdowns_response("mortgage_step1", "he", &configs);
    let legacy = build_legacy_dropdowns_response("mortgage_step1", "he", outcome.drafts);

    assert!(jsonb.jsonb_source);
    assert!(!legacy.jsonb_source);
    assert_eq!(legacy.performance.as_ref().unwrap().source, "content_items_translations");
    assert_eq!(legacy.dropdowns, jsonb.dropdowns);
    assert_eq!(legacy.options, jsonb.options);
    assert_eq!(legacy.labels["mortgage_step1_property_ownership"], "בעלות על נכס");
    assert_eq!(
        legacy.option_list("mortgage_step1_property_ownership").unwrap().len(),
        3
    );
}

#[test]
fn test_draft_state_against_stored_configs() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let outcome = build_dropdown_configs(&ownership_rows(), &languages(), "test", now);
    let draft = &outcome.drafts[0];

    // No dropdown_configs table yet reads as nothing stored
    assert_eq!(draft.state(None), ConfigState::Missing);
    assert_eq!(draft.state(Some(1)), ConfigState::Stale { stored: 1 });
    assert_eq!(draft.state(Some(3)), ConfigState::Current);
}

#[test]
fn test_content_response_shape() {
    let rows = vec![ScreenContentRow {
        content_key: "mortgage_step1.title".to_string(),
        component_type: "text".to_string(),
        category: Some("headers".to_string()),
        content_value: Some("Mortgage calculator".to_string()),
        language_code: "en".to_string(),
        status: Some("approved".to_string()),
    }];
    let response = build_content_response("mortgage_step1", "en", &rows, Some("text"));
    assert_eq!(response.content_count, 1);
    assert_eq!(response.content["mortgage_step1.title"].value, "Mortgage calculator");
    assert_eq!(response.filtered_by_type.as_deref(), Some("text"));

    let body = serde_json::to_value(build_content_response("mortgage_step1", "en", &rows, None)).unwrap();
    assert!(body.get("filtered_by_type").is_none());
}

#[test]
fn test_verify_dropdowns_clean_and_broken() {
    let configs = vec![config(
        "mortgage_step1",
        "property_ownership",
        &[("en", "Property ownership")],
        &[("1", "No property"), ("2", "")],
    )];
    let mut response = build_dropdowns_response("mortgage_step1", "ru", &configs);

    let report = verify_dropdowns(&configs, &response);
    assert_eq!(
        report.issues,
        vec![Issue::EmptyOptionText {
            dropdown_key: "mortgage_step1_property_ownership".to_string(),
            value: "2".to_string(),
        }]
    );

    response.labels.clear();
    response.options.insert(
        "mortgage_step1_property_ownership".to_string(),
        OptionsEntry::List(Vec::new()),
    );
    let report = verify_dropdowns(&configs, &response);
    assert!(!report.is_clean());
    assert!(report.issues.contains(&Issue::MissingLabel {
        dropdown_key: "mortgage_step1_property_ownership".to_string()
    }));
    assert!(report.issues.contains(&Issue::OptionCountMismatch {
        dropdown_key: "mortgage_step1_property_ownership".to_string(),
        stored: 2,
        served: 0,
    }));
}

#[test]
fn test_verify_content_reports_missing_keys() {
    let rows = vec![ScreenContentRow {
        content_key: "a".to_string(),
        component_type: "text".to_string(),
        category: None,
        content_value: Some("A".to_string()),
        language_code: "en".to_string(),
        status: Some("approved".to_string()),
    }];
    let response = build_content_response("s", "en", &rows, None);
    let report = verify_content(&["a", "b"], &response);
    assert_eq!(report.checked, 2);
    assert_eq!(
        report.issues,
        vec![Issue::MissingContentKey {
            content_key: "b".to_string()
        }]
    );
    assert!(verify_content(&["a"], &response).is_clean());
}
