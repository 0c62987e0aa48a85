//! Compares stored dropdowns and content with what the content API serves.

use clap::Parser;
use content_doctor::config::Config;
use content_doctor::content_client::ContentApiClient;
use content_doctor::content_store::ContentStore;
use content_doctor::db::Database;
use content_doctor::verification::{verify_content, verify_dropdowns, VerificationReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Verify the content API against the database")]
struct Args {
    /// Screens to verify; defaults to every screen with dropdown configs.
    #[arg(long = "screen")]
    screens: Vec<String>,

    /// Languages to verify; defaults to CONTENT_LANGUAGES.
    #[arg(long = "language")]
    languages: Vec<String>,

    /// Clear the server cache before verifying.
    #[arg(long)]
    clear_cache: bool,

    /// Print reports as JSON.
    #[arg(long)]
    json: bool,
}

fn print_report(kind: &str, report: &VerificationReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    let status = if report.is_clean() { "ok" } else { "FAIL" };
    println!(
        "[{}] {} {}/{}: {} checked, {} issues",
        status,
        kind,
        report.screen_location,
        report.language_code,
        report.checked,
        report.issues.len()
    );
    for issue in &report.issues {
        println!("    - {}", issue);
    }
    Ok(())
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
    let client = ContentApiClient::new(config.require_api_base_url()?)?;
    let db = Database::new(&config.database_url, config.max_connections).await?;
    let store = ContentStore::new(db.pool.clone());

    if args.clear_cache {
        client.clear_cache().await?;
    }

    let screens = if args.screens.is_empty() {
        store.list_config_screens().await?
    } else {
        args.screens.clone()
    };
    let languages = if args.languages.is_empty() {
        config.languages.clone()
    } else {
        args.languages.clone()
    };

    let mut failures = 0usize;
    for screen in &screens {
        let configs = store.fetch_dropdown_configs(screen).await?;
        for language in &languages {
            let dropdowns = client.get_dropdowns(screen, language).await?;
            let report = verify_dropdowns(&configs, &dropdowns);
            print_report("dropdowns", &report, args.json)?;
            failures += usize::from(!report.is_clean());

            let expected: Vec<String> = store
                .fetch_screen_content(screen, language, None)
                .await?
                .into_iter()
                .map(|row| row.content_key)
                .collect();
            let content = client.get_content(screen, language, None).await?;
            let report = verify_content(&expected, &content);
            print_report("content", &report, args.json)?;
            failures += usize::from(!report.is_clean());
        }
    }

    tracing::info!(
        "Verified {} screens x {} languages against {}: {} failing checks",
        screens.len(),
        languages.len(),
        client.base_url(),
        failures
    );

    db.close().await;
    if failures > 0 {
        anyhow::bail!("{} verification checks failed", failures);
    }
    Ok(())
}
