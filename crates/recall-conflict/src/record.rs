// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict detection result types.

use strum::{Display, EnumString};

use recall_core::ContextEntry;

/// The kind of conflict detected between two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ConflictType {
    /// The entries assert opposite things (antonym keyword pair).
    Contradiction,
    /// Same slot, different value, or a temporal progression
    /// ("was" vs "am").
    Update,
    /// Near-identical content.
    Duplicate,
}

/// A detected conflict between two stored entries.
///
/// Ephemeral: resolution consumes it and emits state mutations to the two
/// entries (and possibly a new merged entry); the record itself is never
/// persisted.
#[derive(Debug, Clone)]
pub struct ConflictRecord {
    pub first: ContextEntry,
    pub second: ContextEntry,
    pub conflict_type: ConflictType,
    /// Fixed per-detector confidence (similarity ratio for duplicates).
    pub confidence: f64,
    pub reasoning: String,
    pub suggested_action: String,
}

/// Outcome of resolving one conflict.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The surviving or newly created entry, when a resolution applied.
    pub merged_entry: Option<ContextEntry>,
    /// 1 when the conflict was resolved, 0 when it was skipped.
    pub conflicts_resolved: usize,
    /// Human-readable audit of what was done.
    pub actions_taken: Vec<String>,
    /// Confidence in the resolution itself.
    pub confidence: f64,
}

impl MergeResult {
    /// A no-op result for conflicts skipped by the optimistic re-check.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            merged_entry: None,
            conflicts_resolved: 0,
            actions_taken: vec![reason.into()],
            confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_type_display_round_trips() {
        use std::str::FromStr;
        for ct in [
            ConflictType::Contradiction,
            ConflictType::Update,
            ConflictType::Duplicate,
        ] {
            assert_eq!(ConflictType::from_str(&ct.to_string()).unwrap(), ct);
        }
    }

    #[test]
    fn skipped_result_resolves_nothing() {
        let result = MergeResult::skipped("entries changed since detection");
        assert!(result.merged_entry.is_none());
        assert_eq!(result.conflicts_resolved, 0);
        assert_eq!(result.confidence, 0.0);
    }
}
