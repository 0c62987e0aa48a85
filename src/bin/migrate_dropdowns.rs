//! Migrates legacy dropdown rows into JSONB `dropdown_configs`.
//!
//! Rows are read from `DATABASE_URL`. Configs are written to
//! `--target-database-url` (or `TARGET_DATABASE_URL`) when given, else to the
//! source database.

use chrono::Utc;
use clap::Parser;
use content_doctor::config::{optional_database_url, Config};
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Build dropdown_configs from content_items/content_translations")]
struct Args {
    /// Screens to migrate; defaults to every screen with dropdown rows.
    #[arg(long = "screen")]
    screens: Vec<String>,

    /// Build and report without writing.
    #[arg(long)]
    dry_run: bool,

    /// Write configs to this database instead of the source one.
    #[arg(long)]
    target_database_url: Option<String>,
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

    let target_url = optional_database_url(args.target_database_url.clone())?
        .or_else(|| config.target_database_url.clone());
    let target_db = match target_url {
        Some(url) => {
            tracing::info!("Writing dropdown configs to a separate target database");
            Some(Database::new(&url, config.max_connections).await?)
        }
        None => None,
    };
    let target = match &target_db {
        Some(target_db) => ContentStore::new(target_db.pool.clone()),
        None => store.clone(),
    };

    if !args.dry_run {
        target.ensure_dropdown_configs_table().await?;
    }

    let screens = if args.screens.is_empty() {
        store.list_dropdown_screens().await?
    } else {
        args.screens.clone()
    };
    tracing::info!("Migrating dropdowns for {} screens", screens.len());

    let now = Utc::now();
    let (mut inserted, mut updated, mut skipped, mut failed) = (0usize, 0usize, 0usize, 0usize);

    for screen in &screens {
        let totals = store
            .migrate_screen_dropdowns(
                &target,
                screen,
                &config.languages,
                "migrate_dropdowns",
                now,
                args.dry_run,
            )
            .await?;
        inserted += totals.inserted;
        updated += totals.updated;
        skipped += totals.skipped_keys.len();
        failed += totals.failed.len();

        tracing::info!(
            "{}: {} rows -> {} dropdowns ({} keys skipped)",
            screen,
            totals.rows,
            totals.drafts,
            totals.skipped_keys.len()
        );
    }

    tracing::info!(
        "Migration complete. Inserted: {}, Updated: {}, Skipped keys: {}, Failed: {}",
        inserted,
        updated,
        skipped,
        failed
    );

    if let Some(target_db) = target_db {
        target_db.close().await;
    }
    db.close().await;
    if failed > 0 {
        anyhow::bail!("{} dropdown configs failed to upsert", failed);
    }
    Ok(())
}
