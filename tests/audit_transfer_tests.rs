/// Audit statistics, text tables and export/import file handling
use chrono::{TimeZone, Utc};
use content_doctor::audit::{
    classify_key_pattern, duplication_rate, pattern_distribution, render_table, screen_context,
    truncate, KeyPattern,
};
use content_doctor::transfer::{
    group_by_process, group_by_screen, pivot_export_rows, read_csv, write_csv, write_export,
    ExportRow,
};

#[test]
fn test_classify_key_patterns() {
    assert_eq!(
        classify_key_pattern("app.mortgage.step1.field.city"),
        KeyPattern::AppDotted
    );
    assert_eq!(
        classify_key_pattern("mortgage_step1_city"),
        KeyPattern::ScreenField
    );
    assert_eq!(
        classify_key_pattern("calculate_mortgage_city_option_1"),
        KeyPattern::DropdownOption
    );
    assert_eq!(classify_key_pattern("city_ph"), KeyPattern::Placeholder);
    assert_eq!(classify_key_pattern("city_label"), KeyPattern::Label);
    assert_eq!(classify_key_pattern("error_required"), KeyPattern::ValidationError);
    assert_eq!(classify_key_pattern("title"), KeyPattern::Other);
}

#[test]
fn test_screen_context() {
    assert_eq!(screen_context("mortgage_step1"), "mortgage");
    assert_eq!(screen_context("credit_refi_step1"), "credit");
    assert_eq!(screen_context("bank_worker_dashboard"), "bank_ops");
    assert_eq!(screen_context("home_page"), "other");
}

#[test]
fn test_duplication_rate() {
    assert_eq!(duplication_rate(1000, 750), 25.0);
    assert_eq!(duplication_rate(3, 2), 33.3);
    assert_eq!(duplication_rate(0, 0), 0.0);
}

#[test]
fn test_pattern_distribution_sorted_by_count() {
    let dist = pattern_distribution(["a_ph", "title", "b_ph"]);
    assert_eq!(
        dist,
        vec![
            (KeyPattern::Placeholder, 2, 66.7),
            (KeyPattern::Other, 1, 33.3)
        ]
    );
}

#[test]
fn test_render_table() {
    let out = render_table(&["a", "bb"], &[vec!["xyz".to_string(), "1".to_string()]]);
    assert_eq!(out, "a   | bb\n--------\nxyz | 1\n");
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("abcdef", 4), "abc…");
    assert_eq!(truncate("abc", 4), "abc");
}

fn export_row(id: i64, key: &str, screen: &str, lang: Option<&str>, value: &str, status: &str) -> ExportRow {
    ExportRow {
        content_id: id,
        content_key: key.to_string(),
        screen_location: screen.to_string(),
        component_type: "text".to_string(),
        category: Some("general".to_string()),
        is_active: Some(true),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()),
        language_code: lang.map(str::to_string),
        content_value: lang.map(|_| value.to_string()),
        translation_status: lang.map(|_| status.to_string()),
    }
}

fn sample_rows() -> Vec<ExportRow> {
    vec![
        export_row(1, "title", "mortgage_step1", Some("en"), "Mortgage", "approved"),
        export_row(1, "title", "mortgage_step1", Some("he"), "משכנתא", "draft"),
        export_row(1, "title", "mortgage_step1", Some("ru"), "Ипотека", "approved"),
        export_row(2, "title", "credit_refi_step1", Some("en"), "Refinance", "approved"),
        export_row(3, "footer", "global_footer", None, "", ""),
        export_row(4, "hero", "home_page", Some("en"), "Welcome", "approved"),
    ]
}

#[test]
fn test_pivot_export_rows() {
    let records = pivot_export_rows(&sample_rows());
    assert_eq!(records.len(), 4);

    // ordered by (screen, key)
    let screens: Vec<&str> = records.iter().map(|r| r.screen_location.as_str()).collect();
    assert_eq!(
        screens,
        vec!["credit_refi_step1", "global_footer", "home_page", "mortgage_step1"]
    );

    let mortgage = &records[3];
    assert_eq!(mortgage.english_text, "Mortgage");
    assert_eq!(mortgage.hebrew_text, "משכנתא");
    assert_eq!(mortgage.russian_text, "Ипотека");
    assert_eq!(mortgage.translation_status, "approved");

    let footer = &records[1];
    assert!(footer.english_text.is_empty());
    assert!(footer.translation_status.is_empty());
}

#[test]
fn test_grouping() {
    let records = pivot_export_rows(&sample_rows());
    let by_screen = group_by_screen(&records);
    assert_eq!(by_screen.len(), 4);

    let by_process = group_by_process(&records);
    assert_eq!(by_process.credit.len(), 1);
    assert_eq!(by_process.credit_refi.len(), 1);
    assert_eq!(by_process.mortgage.len(), 1);
    assert_eq!(by_process.home_page.len(), 1);
    assert!(by_process.refinance.is_empty());
    assert_eq!(by_process.global.len(), 1);
    assert_eq!(by_process.global[0].screen_location, "global_footer");
}

#[test]
fn test_csv_written_records_read_back() {
    let records = pivot_export_rows(&sample_rows());
    let mut buf = Vec::new();
    write_csv(&records, &mut buf).unwrap();

    let header = String::from_utf8(buf.clone()).unwrap();
    assert!(header.starts_with("content_id,content_key,screen_location"));

    let read = read_csv(buf.as_slice()).unwrap();
    assert_eq!(read, records);
}

#[test]
fn test_write_export_creates_files() {
    let dir = std::env::temp_dir().join(format!("content_doctor_export_{}", std::process::id()));
    let records = pivot_export_rows(&sample_rows());
    let files = write_export(&dir, &records).unwrap();

    assert!(files.csv.exists());
    let by_process: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files.by_process).unwrap()).unwrap();
    assert_eq!(by_process["mortgage"][0]["english_text"], "Mortgage");

    std::fs::remove_dir_all(&dir).unwrap();
}
