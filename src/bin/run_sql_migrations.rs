//! Runs `.sql` content migrations, one transaction per file.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::sql_migrations::{discover, run_migration, MigrationOutcome, SqlMigration};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Execute SQL content migrations and verify their screens")]
struct Args {
    /// Migration files or directories of `.sql` files, run in the given order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Warn about keys shared by several screens starting with this prefix.
    #[arg(long)]
    shared_prefix: Option<String>,

    /// Continue with the next file after a failure.
    #[arg(long)]
    keep_going: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args = Args::parse();
    let mut files = Vec::new();
    for path in &args.paths {
        if path.is_dir() {
            files.extend(discover(path)?);
        } else {
            files.push(path.clone());
        }
    }

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.max_connections).await?;

    if let Some(prefix) = &args.shared_prefix {
        let shared = ContentStore::new(db.pool.clone())
            .keys_shared_across_screens(prefix)
            .await?;
        for key in &shared {
            tracing::warn!(
                "{} is used by {} screens: {}",
                key.content_key,
                key.occurrences,
                key.screens.join(", ")
            );
        }
    }

    let (mut committed, mut rolled_back) = (0usize, 0usize);
    for path in &files {
        let migration = SqlMigration::load(path)?;
        match run_migration(&db.pool, &migration).await? {
            MigrationOutcome::Committed(Some(totals)) => {
                committed += 1;
                tracing::info!(
                    "{}: committed, {} items / {} translations / {} languages on {}",
                    migration.name,
                    totals.items,
                    totals.translations,
                    totals.languages,
                    migration.screen.as_deref().unwrap_or_default()
                );
            }
            MigrationOutcome::Committed(None) => {
                committed += 1;
                tracing::info!("{}: committed", migration.name);
            }
            MigrationOutcome::RolledBackEmpty => {
                rolled_back += 1;
                tracing::error!(
                    "{}: no items on {} afterwards, rolled back",
                    migration.name,
                    migration.screen.as_deref().unwrap_or_default()
                );
                if !args.keep_going {
                    break;
                }
            }
            MigrationOutcome::Failed(message) => {
                rolled_back += 1;
                tracing::error!("{}: {}, rolled back", migration.name, message);
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    tracing::info!(
        "{} of {} migrations committed, {} rolled back",
        committed,
        files.len(),
        rolled_back
    );

    db.close().await;
    if rolled_back > 0 {
        anyhow::bail!("{} migrations rolled back", rolled_back);
    }
    Ok(())
}
