//! Audit of the content tables: duplicates, coverage and dropdown health.

use clap::Parser;
use content_doctor::audit::{
    context_distribution, merge_coverage, pattern_distribution, render_table, truncate,
};
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Audit content items and translations")]
struct Args {
    /// Maximum number of duplicate keys to list.
    #[arg(long, default_value_t = 20)]
    limit: i64,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
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

    tracing::info!("Collecting audit data...");
    let stats = store.summary_stats().await?;
    let component_counts = store.component_type_counts().await?;
    let duplicates = store.duplicate_keys(args.limit).await?;
    let coverage = merge_coverage(
        store.screen_coverage(&config.languages).await?,
        &store.language_counts().await?,
    );
    let missing = store.missing_translations(config.languages.len()).await?;
    let empty_dropdowns = store.containers_without_options().await?;
    let option_usage = store.option_type_usage().await?;
    let keys = store.all_content_keys().await?;
    let patterns = pattern_distribution(keys.iter().map(String::as_str));
    let contexts = context_distribution(&store.screen_component_counts().await?);

    if args.json {
        let report = json!({
            "summary": stats,
            "duplication_rate_percent": stats.duplication_rate(),
            "component_types": component_counts,
            "duplicate_keys": duplicates,
            "coverage": coverage,
            "missing_translations": missing,
            "containers_without_options": empty_dropdowns,
            "option_type_usage": option_usage,
            "key_patterns": patterns
                .iter()
                .map(|(p, count, pct)| json!({"pattern": p.as_str(), "count": count, "percent": pct}))
                .collect::<Vec<_>>(),
            "contexts": contexts
                .iter()
                .map(|((ctx, ty), n)| json!({"context": ctx, "component_type": ty, "items": n}))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        db.close().await;
        return Ok(());
    }

    println!("== Summary ==");
    println!(
        "{}",
        render_table(
            &["metric", "value"],
            &[
                vec!["content items".into(), stats.total_content_items.to_string()],
                vec!["unique keys".into(), stats.unique_content_keys.to_string()],
                vec!["screens".into(), stats.total_screens.to_string()],
                vec!["component types".into(), stats.total_component_types.to_string()],
                vec!["translations".into(), stats.total_translations.to_string()],
                vec!["languages".into(), stats.supported_languages.to_string()],
                vec!["duplication rate".into(), format!("{}%", stats.duplication_rate())],
            ],
        )
    );

    println!("== Component types per step screen ==");
    let rows: Vec<Vec<String>> = component_counts
        .iter()
        .map(|c| {
            vec![
                c.screen_location.clone(),
                c.component_type.clone(),
                c.item_count.to_string(),
                c.unique_keys.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["screen", "component_type", "items", "unique_keys"], &rows)
    );

    println!("== Most duplicated keys ==");
    let rows: Vec<Vec<String>> = duplicates
        .iter()
        .map(|d| {
            vec![
                truncate(&d.content_key, 60),
                d.occurrences.to_string(),
                truncate(&d.screens.join(","), 50),
                d.component_types.join(","),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["content_key", "count", "screens", "types"], &rows)
    );

    println!("== Translation coverage ({}) ==", config.languages.join("/"));
    let rows: Vec<Vec<String>> = coverage
        .iter()
        .map(|c| {
            let per_language = config
                .languages
                .iter()
                .map(|l| format!("{}={}", l, c.per_language.get(l).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join(" ");
            vec![
                c.screen_location.clone(),
                c.total_items.to_string(),
                c.complete_items.to_string(),
                format!("{}%", c.complete_coverage_percent),
                per_language,
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(
            &["screen", "items", "complete", "coverage", "per_language"],
            &rows
        )
    );

    println!("== Dropdown items missing translations ==");
    let rows: Vec<Vec<String>> = missing
        .iter()
        .map(|m| {
            vec![
                m.screen_location.clone(),
                truncate(&m.content_key, 60),
                m.component_type.clone(),
                m.languages.join(","),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["screen", "content_key", "type", "languages"], &rows)
    );

    println!("== Dropdowns without options ==");
    let rows: Vec<Vec<String>> = empty_dropdowns
        .iter()
        .map(|e| vec![e.screen_location.clone(), e.containers.to_string()])
        .collect();
    println!("{}", render_table(&["screen", "containers"], &rows));

    println!("== Option component types ==");
    let rows: Vec<Vec<String>> = option_usage
        .iter()
        .map(|o| {
            vec![
                o.screen_location.clone(),
                o.component_type.clone(),
                o.item_count.to_string(),
                truncate(
                    &o.sample_keys.iter().take(3).cloned().collect::<Vec<_>>().join(","),
                    70,
                ),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["screen", "type", "items", "sample_keys"], &rows)
    );

    println!("== Key naming patterns ==");
    let rows: Vec<Vec<String>> = patterns
        .iter()
        .map(|(p, count, pct)| vec![p.as_str().to_string(), count.to_string(), format!("{}%", pct)])
        .collect();
    println!("{}", render_table(&["pattern", "keys", "share"], &rows));

    println!("== Items per context ==");
    let rows: Vec<Vec<String>> = contexts
        .iter()
        .map(|((ctx, ty), n)| vec![ctx.clone(), ty.clone(), n.to_string()])
        .collect();
    println!("{}", render_table(&["context", "component_type", "items"], &rows));

    tracing::info!(
        "Audit complete: {} duplicate keys listed, {} items missing translations, {} screens with empty dropdowns",
        duplicates.len(),
        missing.len(),
        empty_dropdowns.len()
    );

    db.close().await;
    Ok(())
}
