//! Planning for duplicate cleanup.
//!
//! Two invariants drift in the content tables: one translation per
//! (item, language) and one item per (content_key, screen_location). Plans are
//! computed here without touching the database and applied by
//! [`crate::content_store::ContentStore`] inside a single transaction.

use crate::models::{ContentItem, ContentTranslation, TranslationStatus};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationDedupePlan {
    /// Number of (item, language) pairs with more than one row.
    pub duplicate_groups: usize,
    pub keep: Vec<i64>,
    pub delete: Vec<i64>,
}

impl TranslationDedupePlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }
}

/// Keeps one translation per (item, language).
///
/// The survivor is the approved row if any, then the most recently updated,
/// then the highest id.
pub fn plan_translation_dedupe(rows: &[ContentTranslation]) -> TranslationDedupePlan {
    let mut groups: BTreeMap<(i64, &str), Vec<&ContentTranslation>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.content_item_id, row.language_code.as_str()))
            .or_default()
            .push(row);
    }

    let mut plan = TranslationDedupePlan::default();
    for (_, group) in groups {
        if group.len() > 1 {
            plan.duplicate_groups += 1;
        }
        let Some(keeper) = group.iter().max_by_key(|t| {
            (
                t.translation_status() == TranslationStatus::Approved,
                t.updated_at,
                t.id,
            )
        }) else {
            continue;
        };
        plan.keep.push(keeper.id);
        plan.delete
            .extend(group.iter().filter(|t| t.id != keeper.id).map(|t| t.id));
    }

    plan.keep.sort_unstable();
    plan.delete.sort_unstable();
    plan
}

/// Items sharing one (content_key, screen_location) and the survivor among them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMerge {
    pub content_key: String,
    pub screen_location: String,
    pub keeper: i64,
    pub losers: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemDedupePlan {
    pub merges: Vec<ItemMerge>,
}

impl ItemDedupePlan {
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn loser_count(&self) -> usize {
        self.merges.iter().map(|m| m.losers.len()).sum()
    }
}

/// Keeps the oldest item (lowest id) of each duplicated (key, screen) pair.
pub fn plan_item_dedupe(items: &[ContentItem]) -> ItemDedupePlan {
    let mut groups: BTreeMap<(&str, &str), Vec<i64>> = BTreeMap::new();
    for item in items {
        groups
            .entry((item.content_key.as_str(), item.screen_location.as_str()))
            .or_default()
            .push(item.id);
    }

    let merges = groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((key, screen), mut ids)| {
            ids.sort_unstable();
            ids.dedup();
            let keeper = ids[0];
            ItemMerge {
                content_key: key.to_string(),
                screen_location: screen.to_string(),
                keeper,
                losers: ids[1..].to_vec(),
            }
        })
        .filter(|merge| !merge.losers.is_empty())
        .collect();

    ItemDedupePlan { merges }
}

/// Totals reported after applying an item plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemDedupeSummary {
    pub moved_translations: u64,
    pub deleted_translations: u64,
    pub deleted_items: u64,
}
