//! Utility to inspect the content tables and print their structures.

use clap::Parser;
use content_doctor::audit::render_table;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Print the columns of the content tables")]
struct Args {
    /// Tables to describe.
    #[arg(default_values_t = [
        "content_items".to_string(),
        "content_translations".to_string(),
        "dropdown_configs".to_string(),
    ])]
    tables: Vec<String>,
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

    for table in &args.tables {
        let columns = store.table_columns(table).await?;
        if columns.is_empty() {
            tracing::warn!("Table {} not found", table);
            continue;
        }

        println!("{} ({} columns)", table, columns.len());
        let rows: Vec<Vec<String>> = columns
            .into_iter()
            .map(|c| vec![c.column_name, c.data_type, c.is_nullable])
            .collect();
        println!("{}", render_table(&["column", "type", "nullable"], &rows));
    }

    db.close().await;
    Ok(())
}
