//! Exports all content to a CSV plus per-screen and per-flow JSON files.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::transfer::{pivot_export_rows, write_export};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Export content items with their translations")]
struct Args {
    /// Output directory.
    #[arg(long, default_value = "content_export")]
    out_dir: PathBuf,
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

    let rows = store.fetch_export_rows().await?;
    let records = pivot_export_rows(&rows);
    tracing::info!("{} rows pivoted into {} records", rows.len(), records.len());

    let files = write_export(&args.out_dir, &records)?;
    tracing::info!("Wrote {}", files.csv.display());
    tracing::info!("Wrote {}", files.by_screen.display());
    tracing::info!("Wrote {}", files.by_process.display());

    db.close().await;
    Ok(())
}
