use crate::audit::{
    ComponentTypeCount, ContainerWithoutOptions, DuplicateKey, LanguageCount, MissingTranslation,
    OptionTypeUsage, ScreenComponentCount, ScreenCoverageRow, SummaryStats,
};
use crate::dedupe::{
    plan_translation_dedupe, ItemDedupePlan, ItemDedupeSummary, TranslationDedupePlan,
};
use crate::dropdown_builder::{build_dropdown_configs, DropdownConfigDraft};
use crate::errors::{AppError, ResultExt};
use crate::models::{
    ComponentType, ContentItem, ContentTranslation, DropdownConfig, DropdownSourceRow,
    ScreenContentRow, TranslationStatus,
};
use crate::transfer::{ExportRecord, ExportRow, ImportSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashSet;

/// Result of an upsert into `dropdown_configs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// A column as reported by `information_schema.columns`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableColumn {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
}

/// Totals of a screen-to-screen copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CopySummary {
    pub copied_items: u64,
    pub copied_translations: u64,
    /// Target keys that already existed or were copied earlier in the run.
    pub skipped: Vec<String>,
}

/// Totals of migrating the dropdowns of one screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreenDropdownMigration {
    pub rows: usize,
    pub drafts: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped_keys: Vec<String>,
    /// Dropdown keys whose upsert failed.
    pub failed: Vec<String>,
}

/// Replaces the first occurrence of `source` in `key` with `target`.
pub fn rename_key(key: &str, source: &str, target: &str) -> String {
    key.replacen(source, target, 1)
}

/// Columns copied verbatim when duplicating a row: everything but `excluded`.
pub fn copy_columns(all: &[TableColumn], excluded: &[&str]) -> Vec<String> {
    all.iter()
        .map(|c| c.column_name.clone())
        .filter(|name| !excluded.contains(&name.as_str()))
        .collect()
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn dropdown_part_types() -> Vec<String> {
    ComponentType::DROPDOWN_PART_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// All SQL against the content tables.
#[derive(Clone)]
pub struct ContentStore {
    pool: PgPool,
}

impl ContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============ Schema ============

    pub async fn table_columns(&self, table: &str) -> Result<Vec<TableColumn>, AppError> {
        sqlx::query_as::<_, TableColumn>(
            r#"
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable
            FROM information_schema.columns
            WHERE table_name = $1 AND table_schema = current_schema()
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("reading columns of {}", table))
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_name = $1 AND table_schema = current_schema()
            )
            "#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("checking for table {}", table))
    }

    pub async fn ensure_dropdown_configs_table(&self) -> Result<(), AppError> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS dropdown_configs (
                id SERIAL PRIMARY KEY,
                dropdown_key VARCHAR(255) NOT NULL UNIQUE,
                dropdown_data JSONB NOT NULL,
                metadata JSONB DEFAULT '{}',
                category VARCHAR(100),
                screen_location VARCHAR(255),
                field_name VARCHAR(255),
                is_active BOOLEAN DEFAULT true,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_dropdown_configs_screen ON dropdown_configs(screen_location);
            CREATE INDEX IF NOT EXISTS idx_dropdown_configs_field ON dropdown_configs(field_name);
            CREATE INDEX IF NOT EXISTS idx_dropdown_configs_data ON dropdown_configs USING gin(dropdown_data);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating dropdown_configs")?;
        Ok(())
    }

    // ============ Dropdown migration ============

    /// Screens that have active dropdown rows.
    pub async fn list_dropdown_screens(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT screen_location
            FROM content_items
            WHERE component_type = ANY($1) AND is_active = true
            ORDER BY screen_location
            "#,
        )
        .bind(dropdown_part_types())
        .fetch_all(&self.pool)
        .await
        .context("listing dropdown screens")
    }

    /// Approved dropdown rows of a screen, one per item and language.
    pub async fn fetch_dropdown_rows(
        &self,
        screen: &str,
    ) -> Result<Vec<DropdownSourceRow>, AppError> {
        sqlx::query_as::<_, DropdownSourceRow>(
            r#"
            SELECT
                ci.content_key,
                ci.component_type,
                ct.language_code,
                ct.content_value,
                ci.screen_location
            FROM content_items ci
            JOIN content_translations ct ON ci.id = ct.content_item_id
            WHERE ci.screen_location = $1
                AND ct.status = $2
                AND ci.is_active = true
                AND ci.component_type = ANY($3)
            ORDER BY ci.content_key, ct.language_code
            "#,
        )
        .bind(screen)
        .bind(TranslationStatus::APPROVED)
        .bind(dropdown_part_types())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("fetching dropdown rows for {}", screen))
    }

    pub async fn upsert_dropdown_config(
        &self,
        draft: &DropdownConfigDraft,
    ) -> Result<UpsertAction, AppError> {
        let (action,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO dropdown_configs (
                dropdown_key, dropdown_data, screen_location, field_name, category, metadata
            ) VALUES ($1, $2, $3, $4, 'dropdown', $5)
            ON CONFLICT (dropdown_key)
            DO UPDATE SET
                dropdown_data = EXCLUDED.dropdown_data,
                metadata = EXCLUDED.metadata,
                screen_location = EXCLUDED.screen_location,
                field_name = EXCLUDED.field_name,
                updated_at = CURRENT_TIMESTAMP
            RETURNING CASE WHEN xmax = 0 THEN 'inserted' ELSE 'updated' END
            "#,
        )
        .bind(&draft.dropdown_key)
        .bind(Json(&draft.data))
        .bind(&draft.screen_location)
        .bind(&draft.field_name)
        .bind(Json(&draft.data.metadata))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("upserting dropdown {}", draft.dropdown_key))?;

        Ok(if action == "inserted" {
            UpsertAction::Inserted
        } else {
            UpsertAction::Updated
        })
    }

    /// Builds the dropdown configs of `screen` from this store's rows and
    /// upserts them into `target`, which may be another database.
    ///
    /// A failed upsert is logged and counted; the remaining drafts still run.
    pub async fn migrate_screen_dropdowns(
        &self,
        target: &ContentStore,
        screen: &str,
        languages: &[String],
        source: &str,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<ScreenDropdownMigration, AppError> {
        let rows = self.fetch_dropdown_rows(screen).await?;
        let outcome = build_dropdown_configs(&rows, languages, source, now);
        for key in &outcome.skipped_keys {
            tracing::debug!("{}: skipped {}", screen, key);
        }

        let mut totals = ScreenDropdownMigration {
            rows: rows.len(),
            drafts: outcome.drafts.len(),
            skipped_keys: outcome.skipped_keys,
            ..Default::default()
        };

        for draft in &outcome.drafts {
            if dry_run {
                tracing::info!(
                    "[dry-run] {} ({} options)",
                    draft.dropdown_key,
                    draft.data.options.len()
                );
                continue;
            }
            match target.upsert_dropdown_config(draft).await {
                Ok(UpsertAction::Inserted) => totals.inserted += 1,
                Ok(UpsertAction::Updated) => totals.updated += 1,
                Err(e) => {
                    tracing::error!("{}: {}", draft.dropdown_key, e);
                    totals.failed.push(draft.dropdown_key.clone());
                }
            }
        }

        Ok(totals)
    }

    /// Active configs of a screen, ordered by key.
    pub async fn fetch_dropdown_configs(
        &self,
        screen: &str,
    ) -> Result<Vec<DropdownConfig>, AppError> {
        sqlx::query_as::<_, DropdownConfig>(
            r#"
            SELECT
                id::bigint AS id,
                dropdown_key,
                COALESCE(screen_location, '') AS screen_location,
                COALESCE(field_name, dropdown_key) AS field_name,
                dropdown_data,
                COALESCE(is_active, true) AS is_active
            FROM dropdown_configs
            WHERE screen_location = $1 AND is_active = true
            ORDER BY dropdown_key
            "#,
        )
        .bind(screen)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("fetching dropdown configs for {}", screen))
    }

    pub async fn list_config_screens(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT screen_location
            FROM dropdown_configs
            WHERE is_active = true AND screen_location IS NOT NULL
            ORDER BY screen_location
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing dropdown config screens")
    }

    /// Approved, active content of a screen in one language.
    pub async fn fetch_screen_content(
        &self,
        screen: &str,
        language: &str,
        component_type: Option<&str>,
    ) -> Result<Vec<ScreenContentRow>, AppError> {
        sqlx::query_as::<_, ScreenContentRow>(
            r#"
            SELECT
                ci.content_key,
                COALESCE(ci.component_type, '') AS component_type,
                ci.category,
                ct.content_value,
                ct.language_code,
                ct.status
            FROM content_items ci
            JOIN content_translations ct ON ci.id = ct.content_item_id
            WHERE ci.screen_location = $1
                AND ct.language_code = $2
                AND ct.status = $3
                AND ci.is_active = true
                AND ($4::text IS NULL OR ci.component_type = $4)
            ORDER BY ci.content_key
            "#,
        )
        .bind(screen)
        .bind(language)
        .bind(TranslationStatus::APPROVED)
        .bind(component_type)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("fetching content for {}/{}", screen, language))
    }

    // ============ Audit ============

    pub async fn component_type_counts(&self) -> Result<Vec<ComponentTypeCount>, AppError> {
        sqlx::query_as::<_, ComponentTypeCount>(
            r#"
            SELECT
                screen_location,
                COALESCE(component_type, '') AS component_type,
                COUNT(*) AS item_count,
                COUNT(DISTINCT content_key) AS unique_keys
            FROM content_items
            WHERE screen_location LIKE '%step%'
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("counting component types")
    }

    pub async fn screen_component_counts(&self) -> Result<Vec<ScreenComponentCount>, AppError> {
        sqlx::query_as::<_, ScreenComponentCount>(
            r#"
            SELECT screen_location, COALESCE(component_type, '') AS component_type, COUNT(*) AS item_count
            FROM content_items
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("counting items per screen")
    }

    /// Keys used by more than one item anywhere, most frequent first.
    pub async fn duplicate_keys(&self, limit: i64) -> Result<Vec<DuplicateKey>, AppError> {
        sqlx::query_as::<_, DuplicateKey>(
            r#"
            SELECT
                content_key,
                COUNT(*) AS occurrences,
                array_agg(DISTINCT screen_location::text) AS screens,
                array_agg(DISTINCT COALESCE(component_type, '')::text) AS component_types
            FROM content_items
            GROUP BY content_key
            HAVING COUNT(*) > 1
            ORDER BY COUNT(*) DESC, content_key
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("finding duplicate keys")
    }

    /// Keys under `screen_prefix` that live on more than one screen.
    pub async fn keys_shared_across_screens(
        &self,
        screen_prefix: &str,
    ) -> Result<Vec<DuplicateKey>, AppError> {
        sqlx::query_as::<_, DuplicateKey>(
            r#"
            SELECT
                content_key,
                COUNT(DISTINCT screen_location) AS occurrences,
                array_agg(DISTINCT screen_location::text) AS screens,
                array_agg(DISTINCT COALESCE(component_type, '')::text) AS component_types
            FROM content_items
            WHERE screen_location LIKE $1 || '%'
            GROUP BY content_key
            HAVING COUNT(DISTINCT screen_location) > 1
            ORDER BY content_key
            "#,
        )
        .bind(screen_prefix)
        .fetch_all(&self.pool)
        .await
        .context("finding keys shared across screens")
    }

    /// Share of items per step screen translated into every language in `languages`.
    pub async fn screen_coverage(
        &self,
        languages: &[String],
    ) -> Result<Vec<ScreenCoverageRow>, AppError> {
        sqlx::query_as::<_, ScreenCoverageRow>(
            r#"
            SELECT
                screen_location,
                COUNT(*) AS total_items,
                COUNT(*) FILTER (WHERE langs @> $1::text[]) AS complete_items,
                ROUND(COUNT(*) FILTER (WHERE langs @> $1::text[]) * 100.0 / COUNT(*), 1)
                    AS complete_coverage_percent
            FROM (
                SELECT
                    ci.id,
                    ci.screen_location,
                    COALESCE(
                        array_agg(DISTINCT ct.language_code::text)
                            FILTER (WHERE ct.language_code IS NOT NULL),
                        '{}'::text[]
                    ) AS langs
                FROM content_items ci
                LEFT JOIN content_translations ct ON ci.id = ct.content_item_id
                WHERE ci.screen_location LIKE '%step%'
                GROUP BY ci.id, ci.screen_location
            ) items
            GROUP BY screen_location
            ORDER BY complete_coverage_percent ASC, screen_location
            "#,
        )
        .bind(languages)
        .fetch_all(&self.pool)
        .await
        .context("computing translation coverage")
    }

    pub async fn language_counts(&self) -> Result<Vec<LanguageCount>, AppError> {
        sqlx::query_as::<_, LanguageCount>(
            r#"
            SELECT
                ci.screen_location,
                ct.language_code,
                COUNT(DISTINCT ci.id) AS translated_items
            FROM content_items ci
            JOIN content_translations ct ON ci.id = ct.content_item_id
            WHERE ci.screen_location LIKE '%step%'
            GROUP BY ci.screen_location, ct.language_code
            ORDER BY ci.screen_location, ct.language_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("counting translations per language")
    }

    /// Active dropdown items with fewer approved languages than expected.
    pub async fn missing_translations(
        &self,
        expected_languages: usize,
    ) -> Result<Vec<MissingTranslation>, AppError> {
        sqlx::query_as::<_, MissingTranslation>(
            r#"
            SELECT
                ci.screen_location,
                ci.content_key,
                ci.component_type,
                COUNT(DISTINCT ct.language_code) AS translation_count,
                COALESCE(
                    array_agg(DISTINCT ct.language_code::text)
                        FILTER (WHERE ct.language_code IS NOT NULL),
                    '{}'::text[]
                ) AS languages
            FROM content_items ci
            LEFT JOIN content_translations ct
                ON ci.id = ct.content_item_id AND ct.status = $2
            WHERE ci.component_type IN ('option', 'dropdown_option', 'dropdown', 'dropdown_container')
                AND ci.is_active = true
            GROUP BY ci.id, ci.screen_location, ci.content_key, ci.component_type
            HAVING COUNT(DISTINCT ct.language_code) < $1
            ORDER BY ci.screen_location, ci.content_key
            "#,
        )
        .bind(expected_languages as i64)
        .bind(TranslationStatus::APPROVED)
        .fetch_all(&self.pool)
        .await
        .context("finding missing translations")
    }

    /// Screens with dropdown containers but no option rows.
    pub async fn containers_without_options(
        &self,
    ) -> Result<Vec<ContainerWithoutOptions>, AppError> {
        sqlx::query_as::<_, ContainerWithoutOptions>(
            r#"
            SELECT
                screen_location,
                COUNT(DISTINCT CASE WHEN component_type IN ('dropdown', 'dropdown_container')
                    THEN content_key END) AS containers,
                COUNT(DISTINCT CASE WHEN component_type IN ('option', 'dropdown_option')
                    THEN content_key END) AS options
            FROM content_items
            WHERE is_active = true
            GROUP BY screen_location
            HAVING COUNT(DISTINCT CASE WHEN component_type IN ('dropdown', 'dropdown_container')
                    THEN content_key END) > 0
                AND COUNT(DISTINCT CASE WHEN component_type IN ('option', 'dropdown_option')
                    THEN content_key END) = 0
            ORDER BY screen_location
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("finding dropdowns without options")
    }

    /// Which option-like component types each screen uses.
    pub async fn option_type_usage(&self) -> Result<Vec<OptionTypeUsage>, AppError> {
        sqlx::query_as::<_, OptionTypeUsage>(
            r#"
            SELECT
                screen_location,
                COALESCE(component_type, '') AS component_type,
                COUNT(*) AS item_count,
                array_agg(DISTINCT content_key::text ORDER BY content_key::text) AS sample_keys
            FROM content_items
            WHERE content_key LIKE '%option%'
                OR component_type IN ('option', 'dropdown_option', 'dropdown', 'select')
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing option component types")
    }

    pub async fn summary_stats(&self) -> Result<SummaryStats, AppError> {
        sqlx::query_as::<_, SummaryStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM content_items) AS total_content_items,
                (SELECT COUNT(DISTINCT content_key) FROM content_items) AS unique_content_keys,
                (SELECT COUNT(DISTINCT screen_location) FROM content_items) AS total_screens,
                (SELECT COUNT(DISTINCT component_type) FROM content_items) AS total_component_types,
                (SELECT COUNT(*) FROM content_translations) AS total_translations,
                (SELECT COUNT(DISTINCT language_code) FROM content_translations) AS supported_languages
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("computing summary statistics")
    }

    pub async fn all_content_keys(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT content_key FROM content_items")
            .fetch_all(&self.pool)
            .await
            .context("listing content keys")
    }

    // ============ Dedupe ============

    /// Every translation row whose (item, language) pair is duplicated.
    pub async fn fetch_duplicate_translations(
        &self,
    ) -> Result<Vec<ContentTranslation>, AppError> {
        sqlx::query_as::<_, ContentTranslation>(
            r#"
            SELECT
                ct.id::bigint AS id,
                ct.content_item_id::bigint AS content_item_id,
                ct.language_code,
                ct.content_value,
                ct.status,
                ct.updated_at::timestamptz AS updated_at
            FROM content_translations ct
            JOIN (
                SELECT content_item_id, language_code
                FROM content_translations
                GROUP BY content_item_id, language_code
                HAVING COUNT(*) > 1
            ) dup ON dup.content_item_id = ct.content_item_id
                AND dup.language_code = ct.language_code
            ORDER BY ct.content_item_id, ct.language_code, ct.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("fetching duplicate translations")
    }

    /// Every item whose (content_key, screen_location) pair is duplicated.
    pub async fn fetch_duplicate_items(&self) -> Result<Vec<ContentItem>, AppError> {
        sqlx::query_as::<_, ContentItem>(
            r#"
            SELECT
                ci.id::bigint AS id,
                ci.content_key,
                ci.screen_location,
                COALESCE(ci.component_type, '') AS component_type,
                ci.category,
                ci.is_active,
                ci.created_at::timestamptz AS created_at
            FROM content_items ci
            JOIN (
                SELECT content_key, screen_location
                FROM content_items
                GROUP BY content_key, screen_location
                HAVING COUNT(*) > 1
            ) dup ON dup.content_key = ci.content_key
                AND dup.screen_location = ci.screen_location
            ORDER BY ci.screen_location, ci.content_key, ci.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("fetching duplicate items")
    }

    /// Deletes the planned translations; all or nothing.
    pub async fn apply_translation_dedupe(
        &self,
        plan: &TranslationDedupePlan,
    ) -> Result<u64, AppError> {
        if plan.delete.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM content_translations WHERE id = ANY($1)")
            .bind(&plan.delete)
            .execute(&mut *tx)
            .await
            .context("deleting duplicate translations")?
            .rows_affected();

        if deleted != plan.delete.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::InternalError(format!(
                "expected to delete {} translations but {} matched; rolled back",
                plan.delete.len(),
                deleted
            )));
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Merges duplicate items into their keeper; all or nothing.
    ///
    /// Every loser translation moves to the keeper. The keeper's translations
    /// are then deduplicated with [`plan_translation_dedupe`] before the loser
    /// items are deleted.
    pub async fn apply_item_dedupe(
        &self,
        plan: &ItemDedupePlan,
    ) -> Result<ItemDedupeSummary, AppError> {
        let mut summary = ItemDedupeSummary::default();
        if plan.is_empty() {
            return Ok(summary);
        }

        let mut tx = self.pool.begin().await?;
        for merge in &plan.merges {
            summary.moved_translations += sqlx::query(
                "UPDATE content_translations SET content_item_id = $1 WHERE content_item_id = ANY($2)",
            )
            .bind(merge.keeper)
            .bind(&merge.losers)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("moving translations into item {}", merge.keeper))?
            .rows_affected();
        }

        let keepers: Vec<i64> = plan.merges.iter().map(|m| m.keeper).collect();
        let merged = sqlx::query_as::<_, ContentTranslation>(
            r#"
            SELECT
                id::bigint AS id,
                content_item_id::bigint AS content_item_id,
                language_code,
                content_value,
                status,
                updated_at::timestamptz AS updated_at
            FROM content_translations
            WHERE content_item_id = ANY($1)
            ORDER BY content_item_id, language_code, id
            "#,
        )
        .bind(&keepers)
        .fetch_all(&mut *tx)
        .await
        .context("reading merged translations")?;

        let translations = plan_translation_dedupe(&merged);
        if !translations.is_empty() {
            summary.deleted_translations +=
                sqlx::query("DELETE FROM content_translations WHERE id = ANY($1)")
                    .bind(&translations.delete)
                    .execute(&mut *tx)
                    .await
                    .context("deleting superseded translations")?
                    .rows_affected();
        }

        for merge in &plan.merges {
            summary.deleted_items += sqlx::query("DELETE FROM content_items WHERE id = ANY($1)")
                .bind(&merge.losers)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("deleting duplicates of item {}", merge.keeper))?
                .rows_affected();
            tracing::debug!(
                "Merged {} duplicate(s) of {}/{} into {}",
                merge.losers.len(),
                merge.screen_location,
                merge.content_key,
                merge.keeper
            );
        }
        tx.commit().await?;
        Ok(summary)
    }

    // ============ Copy ============

    /// Copies items (and their translations) from one screen to another,
    /// renaming the screen inside each key. Existing target keys are skipped.
    /// Of duplicated source keys only the oldest item is copied.
    pub async fn copy_screen_content(
        &self,
        source: &str,
        target: &str,
        key_prefix: Option<&str>,
    ) -> Result<CopySummary, AppError> {
        let item_columns = copy_columns(
            &self.table_columns("content_items").await?,
            &["id", "content_key", "screen_location", "created_at", "updated_at"],
        );
        let translation_columns = copy_columns(
            &self.table_columns("content_translations").await?,
            &["id", "content_item_id", "created_at", "updated_at"],
        );

        let insert_item = format!(
            "INSERT INTO content_items (content_key, screen_location{extra}) \
             SELECT $1, $2{extra_src} FROM content_items WHERE id = $3 \
             RETURNING id::bigint",
            extra = prefixed(&item_columns),
            extra_src = prefixed(&item_columns),
        );
        let insert_translations = format!(
            "INSERT INTO content_translations (content_item_id{extra}) \
             SELECT $1{extra_src} FROM content_translations WHERE content_item_id = $2",
            extra = prefixed(&translation_columns),
            extra_src = prefixed(&translation_columns),
        );

        let mut tx = self.pool.begin().await?;
        let mut existing: HashSet<String> = sqlx::query_scalar::<_, String>(
            "SELECT content_key FROM content_items WHERE screen_location = $1",
        )
        .bind(target)
        .fetch_all(&mut *tx)
        .await
        .context("reading target keys")?
        .into_iter()
        .collect();

        let sources: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT id::bigint, content_key
            FROM content_items
            WHERE screen_location = $1
                AND ($2::text IS NULL OR content_key LIKE $2 || '%')
            ORDER BY content_key, id
            "#,
        )
        .bind(source)
        .bind(key_prefix)
        .fetch_all(&mut *tx)
        .await
        .context("reading source items")?;

        let mut summary = CopySummary::default();
        for (source_id, key) in sources {
            let new_key = rename_key(&key, source, target);
            if existing.contains(&new_key) {
                summary.skipped.push(new_key);
                continue;
            }

            let new_id: i64 = sqlx::query_scalar::<_, i64>(&insert_item)
                .bind(&new_key)
                .bind(target)
                .bind(source_id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("copying item {}", key))?;

            summary.copied_translations += sqlx::query(&insert_translations)
                .bind(new_id)
                .bind(source_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("copying translations of {}", key))?
                .rows_affected();
            summary.copied_items += 1;
            existing.insert(new_key);
        }

        tx.commit().await?;
        Ok(summary)
    }

    // ============ Export / import ============

    pub async fn fetch_export_rows(&self) -> Result<Vec<ExportRow>, AppError> {
        sqlx::query_as::<_, ExportRow>(
            r#"
            SELECT
                ci.id::bigint AS content_id,
                ci.content_key,
                ci.screen_location,
                COALESCE(ci.component_type, '') AS component_type,
                ci.category,
                ci.is_active,
                ci.created_at::timestamptz AS created_at,
                ct.language_code,
                ct.content_value,
                ct.status AS translation_status
            FROM content_items ci
            LEFT JOIN content_translations ct ON ci.id = ct.content_item_id
            ORDER BY ci.screen_location, ci.content_key, ct.language_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("reading content for export")
    }

    /// Writes non-empty texts of each record as approved translations.
    pub async fn import_translations(
        &self,
        records: &[ExportRecord],
    ) -> Result<ImportSummary, AppError> {
        let mut summary = ImportSummary::default();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let item_id: Option<i64> = sqlx::query_scalar::<_, Option<i64>>(
                r#"
                SELECT MIN(id)::bigint
                FROM content_items
                WHERE content_key = $1 AND screen_location = $2
                "#,
            )
            .bind(&record.content_key)
            .bind(&record.screen_location)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("looking up {}", record.content_key))?;

            let Some(item_id) = item_id else {
                summary
                    .unknown_items
                    .push(format!("{}/{}", record.screen_location, record.content_key));
                continue;
            };

            for (language, text) in record.texts() {
                if text.trim().is_empty() {
                    continue;
                }
                upsert_translation(&mut tx, item_id, language, text, &mut summary).await?;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}

fn prefixed(columns: &[String]) -> String {
    if columns.is_empty() {
        String::new()
    } else {
        format!(", {}", quoted(columns))
    }
}

async fn upsert_translation(
    tx: &mut Transaction<'_, Postgres>,
    item_id: i64,
    language: &str,
    text: &str,
    summary: &mut ImportSummary,
) -> Result<(), AppError> {
    let updated = sqlx::query(
        r#"
        UPDATE content_translations
        SET content_value = $1, status = $2, updated_at = CURRENT_TIMESTAMP
        WHERE content_item_id = $3 AND language_code = $4
        "#,
    )
    .bind(text)
    .bind(TranslationStatus::APPROVED)
    .bind(item_id)
    .bind(language)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("updating translation {} of item {}", language, item_id))?
    .rows_affected();

    if updated > 0 {
        summary.updated += updated;
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO content_translations (content_item_id, language_code, content_value, status)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(item_id)
    .bind(language)
    .bind(text)
    .bind(TranslationStatus::APPROVED)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("inserting translation {} of item {}", language, item_id))?;
    summary.inserted += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> TableColumn {
        TableColumn {
            column_name: name.to_string(),
            data_type: "text".to_string(),
            is_nullable: "YES".to_string(),
        }
    }

    #[test]
    fn test_rename_key_first_occurrence_only() {
        assert_eq!(
            rename_key(
                "mortgage_calculation.field.mortgage_calculation_note",
                "mortgage_calculation",
                "mortgage_step1"
            ),
            "mortgage_step1.field.mortgage_calculation_note"
        );
        assert_eq!(rename_key("other.key", "mortgage", "credit"), "other.key");
    }

    #[test]
    fn test_copy_columns_excludes_identity_and_timestamps() {
        let all = vec![
            column("id"),
            column("content_key"),
            column("screen_location"),
            column("component_type"),
            column("category"),
            column("created_at"),
        ];
        let cols = copy_columns(&all, &["id", "content_key", "screen_location", "created_at"]);
        assert_eq!(cols, vec!["component_type", "category"]);
        assert_eq!(prefixed(&cols), r#", "component_type", "category""#);
        assert_eq!(prefixed(&[]), "");
    }
}
