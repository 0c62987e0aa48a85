//! Removes duplicate content items and duplicate translations.
//!
//! Runs as a dry run unless `--apply` is given.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::dedupe::{plan_item_dedupe, plan_translation_dedupe};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Merge duplicate content items and drop duplicate translations")]
struct Args {
    /// Execute the plan instead of only printing it.
    #[arg(long)]
    apply: bool,
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

    // Items first so the translation pass sees the merged items
    let item_plan = plan_item_dedupe(&store.fetch_duplicate_items().await?);
    tracing::info!(
        "{} duplicated (key, screen) pairs, {} items to remove",
        item_plan.merges.len(),
        item_plan.loser_count()
    );
    for merge in &item_plan.merges {
        println!(
            "{}/{}: keep {}, remove {:?}",
            merge.screen_location, merge.content_key, merge.keeper, merge.losers
        );
    }

    if args.apply && !item_plan.is_empty() {
        let summary = store.apply_item_dedupe(&item_plan).await?;
        tracing::info!(
            "Items merged. Moved translations: {}, Deleted translations: {}, Deleted items: {}",
            summary.moved_translations,
            summary.deleted_translations,
            summary.deleted_items
        );
    }

    let translation_plan = plan_translation_dedupe(&store.fetch_duplicate_translations().await?);
    tracing::info!(
        "{} duplicated (item, language) pairs, {} translations to remove",
        translation_plan.duplicate_groups,
        translation_plan.delete.len()
    );

    if args.apply {
        let deleted = store.apply_translation_dedupe(&translation_plan).await?;
        tracing::info!("Deleted {} duplicate translations", deleted);
    } else if !item_plan.is_empty() || !translation_plan.is_empty() {
        tracing::info!("Dry run. Re-run with --apply to execute.");
    } else {
        tracing::info!("No duplicates found");
    }

    db.close().await;
    Ok(())
}
