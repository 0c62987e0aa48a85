//! Runner for hand-written `.sql` content migrations.
//!
//! A file may name the screen it populates with a `-- screen: <name>` line.
//! After executing such a file the runner checks that the screen has items and
//! rolls the file back otherwise.

use crate::errors::AppError;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SqlMigration {
    pub name: String,
    pub sql: String,
    pub screen: Option<String>,
}

impl SqlMigration {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let sql = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_sql(name, sql))
    }

    pub fn from_sql(name: impl Into<String>, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let screen = parse_screen_directive(&sql);
        Self {
            name: name.into(),
            sql,
            screen,
        }
    }
}

/// Value of the first `-- screen: <name>` comment line.
pub fn parse_screen_directive(sql: &str) -> Option<String> {
    sql.lines().find_map(|line| {
        let comment = line.trim().strip_prefix("--")?.trim();
        let value = comment.strip_prefix("screen:")?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// `.sql` files of `dir`, sorted by file name.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("sql"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ScreenTotals {
    pub items: i64,
    pub translations: i64,
    pub languages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub enum MigrationOutcome {
    /// Committed; totals are present when the file named a screen.
    Committed(Option<ScreenTotals>),
    /// Rolled back because the named screen had no items afterwards.
    RolledBackEmpty,
    /// Rolled back because a statement failed.
    Failed(String),
}

/// Executes one migration in its own transaction.
pub async fn run_migration(
    pool: &PgPool,
    migration: &SqlMigration,
) -> Result<MigrationOutcome, AppError> {
    let mut tx = pool.begin().await?;

    if let Err(e) = sqlx::raw_sql(&migration.sql).execute(&mut *tx).await {
        tx.rollback().await?;
        return Ok(MigrationOutcome::Failed(e.to_string()));
    }

    let Some(screen) = migration.screen.as_deref() else {
        tracing::warn!(
            "{} has no `-- screen:` directive; committing without verification",
            migration.name
        );
        tx.commit().await?;
        return Ok(MigrationOutcome::Committed(None));
    };

    let totals: ScreenTotals = sqlx::query_as(
        r#"
        SELECT
            COUNT(DISTINCT ci.id) AS items,
            COUNT(DISTINCT ct.id) AS translations,
            COUNT(DISTINCT ct.language_code) AS languages
        FROM content_items ci
        LEFT JOIN content_translations ct ON ci.id = ct.content_item_id
        WHERE ci.screen_location = $1
        "#,
    )
    .bind(screen)
    .fetch_one(&mut *tx)
    .await?;

    if totals.items > 0 {
        tx.commit().await?;
        Ok(MigrationOutcome::Committed(Some(totals)))
    } else {
        tx.rollback().await?;
        Ok(MigrationOutcome::RolledBackEmpty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_screen_directive() {
        let sql = "-- Refinance credit step 1\n--   screen: refinance_credit_1\nINSERT INTO content_items VALUES (1);";
        assert_eq!(
            parse_screen_directive(sql),
            Some("refinance_credit_1".to_string())
        );
    }

    #[test]
    fn test_parse_screen_directive_missing_or_empty() {
        assert_eq!(parse_screen_directive("SELECT 1;"), None);
        assert_eq!(parse_screen_directive("-- screen:   \nSELECT 1;"), None);
        assert_eq!(
            parse_screen_directive("SELECT '-- screen: nope';"),
            None
        );
    }

    #[test]
    fn test_from_sql_picks_up_screen() {
        let m = SqlMigration::from_sql("001.sql", "-- screen: mortgage_step1\nSELECT 1;");
        assert_eq!(m.screen.as_deref(), Some("mortgage_step1"));
        assert_eq!(m.name, "001.sql");
    }
}
