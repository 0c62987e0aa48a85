//! Shows how legacy dropdown rows of a screen group into dropdown configs and
//! which stored configs are missing or stale.

use chrono::Utc;
use clap::Parser;
use content_doctor::audit::{render_table, truncate};
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::dropdown_builder::{build_dropdown_configs, ConfigState};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Inspect dropdown rows and stored dropdown configs")]
struct Args {
    /// Screens to check; defaults to every screen with dropdown rows.
    #[arg(long = "screen")]
    screens: Vec<String>,

    /// Language used to display texts.
    #[arg(long, default_value = "en")]
    language: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.max_connections).await?;
    let store = ContentStore::new(db.pool.clone());

    let screens = if args.screens.is_empty() {
        store.list_dropdown_screens().await?
    } else {
        args.screens.clone()
    };

    // Before the first migration every draft counts as missing
    let has_configs = store.table_exists("dropdown_configs").await?;
    if !has_configs {
        tracing::warn!("dropdown_configs does not exist yet; every dropdown is reported missing");
    }

    let mut missing_total = 0usize;
    let mut stale_total = 0usize;

    for screen in &screens {
        let rows = store.fetch_dropdown_rows(screen).await?;
        let outcome = build_dropdown_configs(&rows, &config.languages, "check_dropdowns", Utc::now());
        let stored: BTreeMap<String, usize> = if has_configs {
            store
                .fetch_dropdown_configs(screen)
                .await?
                .into_iter()
                .map(|c| (c.dropdown_key, c.dropdown_data.0.options.len()))
                .collect()
        } else {
            BTreeMap::new()
        };

        println!("== {} ({} rows, {} dropdowns) ==", screen, rows.len(), outcome.drafts.len());
        let table: Vec<Vec<String>> = outcome
            .drafts
            .iter()
            .map(|draft| {
                let state = match draft.state(stored.get(&draft.dropdown_key).copied()) {
                    ConfigState::Missing => {
                        missing_total += 1;
                        "missing".to_string()
                    }
                    ConfigState::Stale { stored } => {
                        stale_total += 1;
                        format!("stale ({} stored)", stored)
                    }
                    ConfigState::Current => "ok".to_string(),
                };
                vec![
                    draft.dropdown_key.clone(),
                    truncate(draft.data.label.resolve(&args.language), 40),
                    truncate(draft.data.placeholder.resolve(&args.language), 30),
                    draft.data.options.len().to_string(),
                    state,
                ]
            })
            .collect();
        println!(
            "{}",
            render_table(
                &["dropdown_key", "label", "placeholder", "options", "config"],
                &table
            )
        );

        if !outcome.skipped_keys.is_empty() {
            tracing::warn!(
                "{}: {} keys not assignable to a dropdown: {}",
                screen,
                outcome.skipped_keys.len(),
                outcome.skipped_keys.join(", ")
            );
        }
    }

    tracing::info!(
        "Checked {} screens: {} configs missing, {} stale",
        screens.len(),
        missing_total,
        stale_total
    );

    db.close().await;
    Ok(())
}
