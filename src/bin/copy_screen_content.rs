//! Copies content items and their translations from one screen to another.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Copy a screen's content under a new screen_location")]
struct Args {
    /// Screen to copy from.
    #[arg(long)]
    source: String,

    /// Screen to copy into; also replaces the source name inside each key.
    #[arg(long)]
    target: String,

    /// Only copy keys starting with this prefix.
    #[arg(long)]
    key_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    if args.source == args.target {
        anyhow::bail!("--source and --target must differ");
    }

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.max_connections).await?;
    let store = ContentStore::new(db.pool.clone());

    tracing::info!("Copying {} -> {}", args.source, args.target);
    let summary = store
        .copy_screen_content(&args.source, &args.target, args.key_prefix.as_deref())
        .await?;

    for key in &summary.skipped {
        tracing::warn!("{} already exists on {}, skipped", key, args.target);
    }
    tracing::info!(
        "Copy complete. Items: {}, Translations: {}, Skipped: {}",
        summary.copied_items,
        summary.copied_translations,
        summary.skipped.len()
    );

    db.close().await;
    Ok(())
}
