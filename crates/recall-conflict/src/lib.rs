// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict detection and resolution for the recall context engine.
//!
//! - **ConflictDetector**: pairwise detection (contradiction, update,
//!   duplicate) over a set of stored entries
//! - **ConflictResolver**: deterministic resolution with optimistic
//!   concurrency against the store
//!
//! Both run as batch/background passes, never on the request hot path.

pub mod detector;
pub mod record;
pub mod resolver;

pub use detector::ConflictDetector;
pub use record::{ConflictRecord, ConflictType, MergeResult};
pub use resolver::ConflictResolver;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use recall_config::model::ConflictConfig;
    use recall_core::{ContextCategory, ContextEntry, ContextStore, ValidationStatus};
    use recall_test_utils::MemoryStore;

    use super::*;

    fn entry_at(content: &str, days_ago: i64, confidence: f64) -> ContextEntry {
        let mut entry = ContextEntry::new_manual(content);
        entry.context_category = ContextCategory::Work;
        entry.set_confidence(confidence);
        entry.created_at = Utc::now() - Duration::days(days_ago);
        entry.updated_at = entry.created_at;
        entry
    }

    #[tokio::test]
    async fn employer_change_resolves_as_progression() {
        // "I work at Acme" (older, higher confidence) vs "I work at Globex".
        let acme = entry_at("I work at Acme", 40, 0.9);
        let globex = entry_at("I work at Globex", 10, 0.8);
        let store = Arc::new(MemoryStore::seeded(vec![acme.clone(), globex.clone()]));

        let detector = ConflictDetector::new(&ConflictConfig::default()).unwrap();
        let conflicts = detector.detect(&[acme.clone(), globex.clone()]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Update);

        let resolver = ConflictResolver::new(store.clone());
        let result = resolver.resolve(&conflicts[0]).await.unwrap();
        assert_eq!(result.conflicts_resolved, 1);

        let merged = result.merged_entry.unwrap();
        assert!(merged.content.contains("Acme"));
        assert!(merged.content.contains("Globex"));
        assert!(merged.content.starts_with("Previously:"));
        // max(0.9, 0.8) * 0.9
        assert!((merged.confidence_score - 0.81).abs() < 1e-9);

        let entries = store.all();
        for id in [&acme.id, &globex.id] {
            let original = entries.iter().find(|e| &e.id == id).unwrap();
            assert_eq!(original.validation_status, ValidationStatus::Outdated);
            assert!(original.metadata.contains_key("conflict_resolution"));
        }
    }

    #[tokio::test]
    async fn contradiction_keeps_recent_and_disputes_other() {
        let old = entry_at("I love spicy food", 30, 0.9);
        let new = entry_at("I hate spicy food", 1, 0.6);
        let store = Arc::new(MemoryStore::seeded(vec![old.clone(), new.clone()]));

        let detector = ConflictDetector::new(&ConflictConfig::default()).unwrap();
        let conflicts = detector.detect(&[old.clone(), new.clone()]);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Contradiction);

        let resolver = ConflictResolver::new(store.clone());
        let result = resolver.resolve(&conflicts[0]).await.unwrap();

        let winner = result.merged_entry.unwrap();
        assert_eq!(winner.id, new.id, "more recent entry wins");

        let stored_old = store.get(&old.id).await.unwrap().unwrap();
        assert_eq!(stored_old.validation_status, ValidationStatus::Disputed);
        let provenance = &stored_old.metadata["conflict_resolution"];
        assert_eq!(
            provenance["chosen_context_id"],
            serde_json::Value::String(new.id.clone())
        );
    }

    #[tokio::test]
    async fn duplicate_keeps_higher_confidence_and_merges_stats() {
        let mut strong = entry_at("I enjoy long mountain hikes", 5, 0.9);
        strong.tags = vec!["hiking".to_string()];
        strong.access_count = 7;
        let mut weak = entry_at("I enjoy long mountain hike", 5, 0.6);
        weak.tags = vec!["outdoors".to_string()];
        weak.access_count = 3;
        let store = Arc::new(MemoryStore::seeded(vec![strong.clone(), weak.clone()]));

        let detector = ConflictDetector::new(&ConflictConfig::default()).unwrap();
        let conflicts = detector.detect(&[strong.clone(), weak.clone()]);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Duplicate);

        let resolver = ConflictResolver::new(store.clone());
        let result = resolver.resolve(&conflicts[0]).await.unwrap();

        let winner = result.merged_entry.unwrap();
        assert_eq!(winner.id, strong.id);
        assert_eq!(winner.access_count, 10);
        assert!(winner.tags.contains(&"hiking".to_string()));
        assert!(winner.tags.contains(&"outdoors".to_string()));

        let stored_weak = store.get(&weak.id).await.unwrap().unwrap();
        assert_eq!(stored_weak.validation_status, ValidationStatus::Outdated);
        assert_eq!(
            stored_weak.metadata["duplicate_of"],
            serde_json::Value::String(strong.id.clone())
        );
    }

    #[tokio::test]
    async fn resolving_the_same_record_twice_is_a_no_op() {
        let strong = entry_at("I enjoy long mountain hikes", 5, 0.9);
        let weak = entry_at("I enjoy long mountain hike", 5, 0.6);
        let store = Arc::new(MemoryStore::seeded(vec![strong.clone(), weak.clone()]));

        let detector = ConflictDetector::new(&ConflictConfig::default()).unwrap();
        let conflicts = detector.detect(&[strong.clone(), weak.clone()]);
        let resolver = ConflictResolver::new(store.clone());

        let first = resolver.resolve(&conflicts[0]).await.unwrap();
        assert_eq!(first.conflicts_resolved, 1);
        let winner_after_first = store.get(&strong.id).await.unwrap().unwrap();

        // Replaying the same record: both entries changed since detection,
        // so the optimistic re-check skips it.
        let second = resolver.resolve(&conflicts[0]).await.unwrap();
        assert_eq!(second.conflicts_resolved, 0);

        let winner_after_second = store.get(&strong.id).await.unwrap().unwrap();
        assert_eq!(
            winner_after_first.access_count,
            winner_after_second.access_count,
            "access counts must not double-merge"
        );
        let weak_after = store.get(&weak.id).await.unwrap().unwrap();
        assert_eq!(weak_after.validation_status, ValidationStatus::Outdated);
    }

    #[tokio::test]
    async fn batch_resolution_is_first_touch_wins() {
        let a = entry_at("I work at Acme", 40, 0.9);
        let b = entry_at("I work at Globex", 10, 0.8);
        let c = entry_at("I work at Initech", 2, 0.7);
        let store = Arc::new(MemoryStore::seeded(vec![a.clone(), b.clone(), c.clone()]));

        let detector = ConflictDetector::new(&ConflictConfig::default()).unwrap();
        let conflicts = detector.detect(&[a.clone(), b.clone(), c.clone()]);
        // (a,b), (a,c), (b,c) all conflict on the employer slot.
        assert_eq!(conflicts.len(), 3);

        let resolver = ConflictResolver::new(store.clone());
        let results = resolver.resolve_batch(&conflicts).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].conflicts_resolved, 1);
        // Every later conflict touching a or b is skipped in this pass.
        assert_eq!(results[1].conflicts_resolved, 0);
        assert_eq!(results[2].conflicts_resolved, 0);

        // c was only party to skipped conflicts and is untouched.
        let stored_c = store.get(&c.id).await.unwrap().unwrap();
        assert_eq!(stored_c.validation_status, ValidationStatus::Confirmed);
    }
}
