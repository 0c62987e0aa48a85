/// Field-name inference across the content key conventions
use content_doctor::core::field_name::{
    classify, extract_field_name, option_number, option_value, KeyRole,
};

fn field(key: &str) -> Option<String> {
    extract_field_name(key)
}

#[test]
fn test_dotted_field_keys() {
    assert_eq!(
        field("mortgage_step1.field.property_ownership").as_deref(),
        Some("property_ownership")
    );
    assert_eq!(
        field("mortgage_step1.field.property_ownership_option_2").as_deref(),
        Some("property_ownership")
    );
    assert_eq!(
        field("mortgage_step1.field.when_needed_options_3").as_deref(),
        Some("when_needed")
    );
    assert_eq!(field("mortgage_step1.field.city_ph").as_deref(), Some("city"));
}

#[test]
fn test_dotted_enum_suffix_keys() {
    assert_eq!(
        field("mortgage_step2.field.family_status_married").as_deref(),
        Some("family_status")
    );
    assert_eq!(
        field("mortgage_step2.field.education_bachelors").as_deref(),
        Some("education")
    );
    assert_eq!(
        field("mortgage_step3.field.field_of_activity_technology").as_deref(),
        Some("field_of_activity")
    );
}

#[test]
fn test_numbered_sentinel_keys() {
    let key = "mortgage_step3.field.additional_income_0_no_additional_income";
    assert_eq!(field(key).as_deref(), Some("additional_income"));
    assert_eq!(option_number(key), Some(0));

    let key = "mortgage_step3.field.obligation_0_no_obligations";
    assert_eq!(field(key).as_deref(), Some("obligation"));
    assert_eq!(option_number(key), Some(0));
}

#[test]
fn test_step_underscore_keys() {
    assert_eq!(
        field("mortgage_step1_property_ownership_ph").as_deref(),
        Some("property_ownership")
    );
    assert_eq!(
        field("mortgage_step1_property_ownership_option_2").as_deref(),
        Some("property_ownership")
    );
    assert_eq!(field("credit_step2_education").as_deref(), Some("education"));
}

#[test]
fn test_calculator_keys() {
    assert_eq!(field("calculate_mortgage_city_ph").as_deref(), Some("city"));
    assert_eq!(
        field("calculate_mortgage_type_option_3").as_deref(),
        Some("type")
    );
    assert_eq!(field("calculate_mortgage_when").as_deref(), Some("when"));
}

#[test]
fn test_unrecognized_keys() {
    assert_eq!(field("home_page_title"), None);
    assert_eq!(field(""), None);
}

#[test]
fn test_option_numbers() {
    assert_eq!(option_number("x.field.city_option_12"), Some(12));
    assert_eq!(option_number("x.field.city_options_4"), Some(4));
    // legacy suffixes are 1-based positions
    assert_eq!(option_number("x.field.property_no_property"), Some(1));
    assert_eq!(option_number("x.field.family_status_married"), Some(5));
    assert_eq!(option_number("x.field.occupation_unemployed"), Some(12));
    assert_eq!(option_number("x.field.city"), None);
}

#[test]
fn test_option_values() {
    assert_eq!(
        option_value("x.field.city_option_3", "city").as_deref(),
        Some("3")
    );
    assert_eq!(
        option_value("mortgage_step2.field.education_bachelors", "education").as_deref(),
        Some("bachelors")
    );
    assert_eq!(option_value("x.field.city", "town"), None);
}

#[test]
fn test_classify_roles() {
    assert_eq!(
        classify("mortgage_step1.field.city", "dropdown_container"),
        KeyRole::Label
    );
    assert_eq!(classify("mortgage_step1.field.city", "label"), KeyRole::Label);
    assert_eq!(
        classify("mortgage_step1.field.city_option_1", "label"),
        KeyRole::Ignored
    );
    assert_eq!(
        classify("mortgage_step1.field.city_ph", "placeholder"),
        KeyRole::Placeholder
    );
    assert_eq!(
        classify("mortgage_step1.field.city_ph", "text"),
        KeyRole::Placeholder
    );
    assert_eq!(
        classify("mortgage_step1.field.city_option_1", "dropdown_option"),
        KeyRole::Option
    );
    assert_eq!(
        classify("mortgage_step1.field.city_option_1", "text"),
        KeyRole::Option
    );
    assert_eq!(
        classify("mortgage_step1.field.family_status_married", "option"),
        KeyRole::Option
    );
    assert_eq!(classify("mortgage_step1.title", "text"), KeyRole::Ignored);
}
