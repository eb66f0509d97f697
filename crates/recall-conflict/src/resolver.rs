// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic conflict resolution.
//!
//! Runs as a batch/background pass, never on the request hot path. Entries
//! may be concurrently touched by a live retrieval call's access-stat
//! write, so every resolution re-reads its entries and skips the conflict
//! when either entry's status or update timestamp changed since detection.
//! The same re-check makes replaying a [`ConflictRecord`] a no-op.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use recall_core::{ContextEntry, ContextSource, ContextStore, RecallError, ValidationStatus};

use crate::record::{ConflictRecord, ConflictType, MergeResult};

/// Confidence discount applied to a merged progression entry.
const PROGRESSION_DISCOUNT: f64 = 0.9;

/// Applies resolution policy to detected conflicts.
pub struct ConflictResolver {
    store: Arc<dyn ContextStore>,
}

impl ConflictResolver {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Resolve a single conflict.
    ///
    /// Policy:
    /// - *Contradiction*: keep the more recently created entry (ties go to
    ///   the higher confidence one); mark the other `Disputed`.
    /// - *Update*: synthesize a "Previously/Currently" progression entry at
    ///   `max(confidence) * 0.9`; mark both originals `Outdated`.
    /// - *Duplicate*: keep the higher-confidence entry, union tags, sum
    ///   access counts; mark the loser `Outdated`.
    pub async fn resolve(&self, record: &ConflictRecord) -> Result<MergeResult, RecallError> {
        // Optimistic re-check: both entries must still look exactly like
        // they did at detection time.
        let Some(first) = self.fetch_unchanged(&record.first).await? else {
            return Ok(MergeResult::skipped(format!(
                "skipped: entry {} changed since detection",
                record.first.id
            )));
        };
        let Some(second) = self.fetch_unchanged(&record.second).await? else {
            return Ok(MergeResult::skipped(format!(
                "skipped: entry {} changed since detection",
                record.second.id
            )));
        };

        match record.conflict_type {
            ConflictType::Contradiction => self.resolve_contradiction(first, second).await,
            ConflictType::Update => self.resolve_update(first, second).await,
            ConflictType::Duplicate => self.resolve_duplicate(first, second).await,
        }
    }

    /// Resolve a batch of conflicts in detection order.
    ///
    /// First-touch wins: a conflict whose entries were already mutated by
    /// an earlier resolution in the same batch is skipped, so each entry
    /// participates in at most one resolution per pass.
    pub async fn resolve_batch(&self, records: &[ConflictRecord]) -> Vec<MergeResult> {
        let mut results = Vec::with_capacity(records.len());
        let mut touched: HashSet<String> = HashSet::new();

        for record in records {
            if touched.contains(&record.first.id) || touched.contains(&record.second.id) {
                results.push(MergeResult::skipped(
                    "skipped: entry already resolved in this batch",
                ));
                continue;
            }

            match self.resolve(record).await {
                Ok(result) => {
                    if result.conflicts_resolved > 0 {
                        touched.insert(record.first.id.clone());
                        touched.insert(record.second.id.clone());
                    }
                    results.push(result);
                }
                Err(e) => {
                    // A comparison that fails mid-batch is skipped, never
                    // aborting the pass.
                    warn!(
                        first = %record.first.id,
                        second = %record.second.id,
                        error = %e,
                        "conflict resolution failed, skipping"
                    );
                    results.push(MergeResult::skipped(format!("skipped: {e}")));
                }
            }
        }

        results
    }

    /// Re-read an entry and return it only if its status and update
    /// timestamp still match the detected snapshot.
    async fn fetch_unchanged(
        &self,
        snapshot: &ContextEntry,
    ) -> Result<Option<ContextEntry>, RecallError> {
        let fresh = self.store.get(&snapshot.id).await?;
        Ok(fresh.filter(|entry| {
            entry.validation_status == snapshot.validation_status
                && entry.updated_at == snapshot.updated_at
        }))
    }

    async fn resolve_contradiction(
        &self,
        first: ContextEntry,
        second: ContextEntry,
    ) -> Result<MergeResult, RecallError> {
        let mut actions = Vec::new();

        let (winner, mut loser) = if first.created_at > second.created_at {
            actions.push(format!("kept {} (more recent)", first.id));
            (first, second)
        } else if second.created_at > first.created_at {
            actions.push(format!("kept {} (more recent)", second.id));
            (second, first)
        } else if first.confidence_score >= second.confidence_score {
            actions.push(format!("kept {} (higher confidence)", first.id));
            (first, second)
        } else {
            actions.push(format!("kept {} (higher confidence)", second.id));
            (second, first)
        };

        loser.validation_status = ValidationStatus::Disputed;
        loser.set_metadata(
            "conflict_resolution",
            serde_json::json!({
                "conflict_type": ConflictType::Contradiction.to_string(),
                "resolved_at": Utc::now().to_rfc3339(),
                "chosen_context_id": winner.id,
            }),
        );
        self.store.save(&loser).await?;
        actions.push(format!("marked {} disputed", loser.id));

        debug!(winner = %winner.id, loser = %loser.id, "contradiction resolved");
        Ok(MergeResult {
            merged_entry: Some(winner),
            conflicts_resolved: 1,
            actions_taken: actions,
            confidence: 0.8,
        })
    }

    async fn resolve_update(
        &self,
        first: ContextEntry,
        second: ContextEntry,
    ) -> Result<MergeResult, RecallError> {
        let mut actions = Vec::new();

        let (mut older, mut newer) = if first.created_at < second.created_at {
            (first, second)
        } else {
            (second, first)
        };

        let mut merged = ContextEntry::new_extracted(
            format!(
                "Previously: {}. Currently: {}.",
                older.content, newer.content
            ),
            older.confidence_score.max(newer.confidence_score) * PROGRESSION_DISCOUNT,
        );
        merged.user_id = older.user_id.clone();
        merged.context_type = older.context_type;
        merged.context_category = older.context_category;
        merged.context_source = ContextSource::Extracted;
        merged.merge_tags(older.tags.iter().cloned());
        merged.merge_tags(newer.tags.iter().cloned());
        merged.set_metadata(
            "merged_from",
            serde_json::json!([older.id, newer.id]),
        );
        merged.set_metadata(
            "merge_type",
            serde_json::Value::String("progression".to_string()),
        );
        let merged = self.store.save(&merged).await?;
        actions.push("merged contexts as historical progression".to_string());

        for original in [&mut older, &mut newer] {
            original.validation_status = ValidationStatus::Outdated;
            original.set_metadata(
                "conflict_resolution",
                serde_json::json!({
                    "conflict_type": ConflictType::Update.to_string(),
                    "resolved_at": Utc::now().to_rfc3339(),
                    "merged_into": merged.id,
                }),
            );
            self.store.save(original).await?;
        }
        actions.push("marked original contexts as outdated".to_string());

        debug!(merged = %merged.id, "update resolved as progression");
        Ok(MergeResult {
            merged_entry: Some(merged),
            conflicts_resolved: 1,
            actions_taken: actions,
            confidence: 0.9,
        })
    }

    async fn resolve_duplicate(
        &self,
        first: ContextEntry,
        second: ContextEntry,
    ) -> Result<MergeResult, RecallError> {
        let mut actions = Vec::new();

        let (mut winner, mut loser) = if first.confidence_score > second.confidence_score {
            (first, second)
        } else {
            (second, first)
        };

        winner.merge_tags(loser.tags.iter().cloned());
        winner.access_count += loser.access_count;
        winner.updated_at = Utc::now();
        let winner = self.store.save(&winner).await?;

        loser.validation_status = ValidationStatus::Outdated;
        loser.set_metadata(
            "duplicate_of",
            serde_json::Value::String(winner.id.clone()),
        );
        self.store.save(&loser).await?;

        actions.push(format!("kept {} (higher confidence)", winner.id));
        actions.push(format!("marked duplicate {} outdated", loser.id));

        debug!(winner = %winner.id, loser = %loser.id, "duplicate resolved");
        Ok(MergeResult {
            merged_entry: Some(winner),
            conflicts_resolved: 1,
            actions_taken: actions,
            confidence: 0.95,
        })
    }
}
