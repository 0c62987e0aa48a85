//! Content export (CSV + JSON breakdowns) and translation import.

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Item joined with one of its translations (or none).
#[derive(Debug, Clone, FromRow)]
pub struct ExportRow {
    pub content_id: i64,
    pub content_key: String,
    pub screen_location: String,
    pub component_type: String,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub language_code: Option<String>,
    pub content_value: Option<String>,
    pub translation_status: Option<String>,
}

/// One spreadsheet row per content item with a column per language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub content_id: i64,
    pub content_key: String,
    pub screen_location: String,
    pub component_type: String,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub english_text: String,
    #[serde(default)]
    pub hebrew_text: String,
    #[serde(default)]
    pub russian_text: String,
    #[serde(default)]
    pub translation_status: String,
}

impl ExportRecord {
    /// (language code, text) pairs carried by the record.
    pub fn texts(&self) -> [(&'static str, &str); 3] {
        [
            ("en", self.english_text.as_str()),
            ("he", self.hebrew_text.as_str()),
            ("ru", self.russian_text.as_str()),
        ]
    }
}

/// Pivots joined rows into one record per (screen, key).
///
/// The status column comes from the English translation.
pub fn pivot_export_rows(rows: &[ExportRow]) -> Vec<ExportRecord> {
    let mut records: BTreeMap<(String, String), ExportRecord> = BTreeMap::new();
    for row in rows {
        let record = records
            .entry((row.screen_location.clone(), row.content_key.clone()))
            .or_insert_with(|| ExportRecord {
                content_id: row.content_id,
                content_key: row.content_key.clone(),
                screen_location: row.screen_location.clone(),
                component_type: row.component_type.clone(),
                category: row.category.clone(),
                is_active: row.is_active,
                created_at: row.created_at,
                english_text: String::new(),
                hebrew_text: String::new(),
                russian_text: String::new(),
                translation_status: String::new(),
            });

        let value = row.content_value.clone().unwrap_or_default();
        match row.language_code.as_deref() {
            Some("en") => {
                record.english_text = value;
                record.translation_status = row.translation_status.clone().unwrap_or_default();
            }
            Some("he") => record.hebrew_text = value,
            Some("ru") => record.russian_text = value,
            _ => {}
        }
    }
    records.into_values().collect()
}

pub fn group_by_screen(records: &[ExportRecord]) -> BTreeMap<String, Vec<&ExportRecord>> {
    let mut out: BTreeMap<String, Vec<&ExportRecord>> = BTreeMap::new();
    for record in records {
        out.entry(record.screen_location.clone())
            .or_default()
            .push(record);
    }
    out
}

/// Records split by product flow. A record can appear in several flows;
/// `global` holds the ones that belong to none.
#[derive(Debug, Default, Serialize)]
pub struct ProcessBreakdown<'a> {
    pub credit: Vec<&'a ExportRecord>,
    pub mortgage: Vec<&'a ExportRecord>,
    pub refinance: Vec<&'a ExportRecord>,
    pub credit_refi: Vec<&'a ExportRecord>,
    pub home_page: Vec<&'a ExportRecord>,
    pub global: Vec<&'a ExportRecord>,
}

pub fn group_by_process(records: &[ExportRecord]) -> ProcessBreakdown<'_> {
    let mut out = ProcessBreakdown::default();
    for record in records {
        let screen = record.screen_location.as_str();
        if screen.contains("credit") {
            out.credit.push(record);
        }
        if screen.contains("mortgage") {
            out.mortgage.push(record);
        }
        if screen.contains("refinance") {
            out.refinance.push(record);
        }
        if screen.contains("credit_refi") {
            out.credit_refi.push(record);
        }
        if screen.contains("home") {
            out.home_page.push(record);
        }
        if !["credit", "mortgage", "refinance", "home"]
            .iter()
            .any(|p| screen.contains(p))
        {
            out.global.push(record);
        }
    }
    out
}

pub fn write_csv<W: Write>(records: &[ExportRecord], writer: W) -> Result<(), AppError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRecord>, AppError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in csv.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Files written by [`write_export`].
#[derive(Debug)]
pub struct ExportFiles {
    pub csv: PathBuf,
    pub by_screen: PathBuf,
    pub by_process: PathBuf,
}

/// Writes the CSV plus per-screen and per-flow JSON files into `dir`.
pub fn write_export(dir: &Path, records: &[ExportRecord]) -> Result<ExportFiles, AppError> {
    std::fs::create_dir_all(dir)?;

    let files = ExportFiles {
        csv: dir.join("content_translations.csv"),
        by_screen: dir.join("content_by_screen.json"),
        by_process: dir.join("content_by_process.json"),
    };

    write_csv(records, std::fs::File::create(&files.csv)?)?;
    std::fs::write(
        &files.by_screen,
        serde_json::to_string_pretty(&group_by_screen(records))?,
    )?;
    std::fs::write(
        &files.by_process,
        serde_json::to_string_pretty(&group_by_process(records))?,
    )?;

    Ok(files)
}

/// Totals of a translation import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub updated: u64,
    pub inserted: u64,
    /// `screen/key` of records with no matching content item.
    pub unknown_items: Vec<String>,
}
