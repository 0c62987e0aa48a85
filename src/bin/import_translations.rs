//! Imports translations from a CSV produced by `export_content`.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::transfer::read_csv;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Write translations from an exported CSV back to the database")]
struct Args {
    /// CSV file to import.
    file: PathBuf,

    /// Parse and report without writing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    let records = read_csv(File::open(&args.file)?)?;
    let texts = records
        .iter()
        .flat_map(|r| r.texts())
        .filter(|(_, text)| !text.trim().is_empty())
        .count();
    tracing::info!(
        "Read {} records with {} non-empty texts from {}",
        records.len(),
        texts,
        args.file.display()
    );

    if args.dry_run {
        return Ok(());
    }

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.max_connections).await?;
    let store = ContentStore::new(db.pool.clone());

    let summary = store.import_translations(&records).await?;
    for item in &summary.unknown_items {
        tracing::warn!("No content item for {}, skipped", item);
    }
    tracing::info!(
        "Import complete. Updated: {}, Inserted: {}, Unknown items: {}",
        summary.updated,
        summary.inserted,
        summary.unknown_items.len()
    );

    db.close().await;
    Ok(())
}
