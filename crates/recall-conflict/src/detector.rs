// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairwise conflict detection over stored entries.
//!
//! For every pair whose categories are not declared incompatible, three
//! detectors run in order, short-circuiting on the first hit:
//! contradiction (antonym and temporal keyword pairs), update
//! (slot re-extraction capturing different values), and duplicate
//! (similarity ratio, reusing the deduplicator's metric).

use regex::RegexBuilder;
use tracing::debug;

use recall_config::model::ConflictConfig;
use recall_core::{ContextCategory, ContextEntry, RecallError};
use recall_extract::similarity_ratio;

use crate::record::{ConflictRecord, ConflictType};

/// Category pairs never compared for conflicts.
///
/// Preserved exactly as authored upstream; the table is checked in both
/// directions but no missing pairs are inferred.
const INCOMPATIBLE_CATEGORIES: &[(ContextCategory, ContextCategory)] = &[
    (ContextCategory::Technical, ContextCategory::Relationships),
    (ContextCategory::Projects, ContextCategory::PersonalInfo),
    (ContextCategory::Skills, ContextCategory::Relationships),
];

/// Positive/negative keyword pairs signalling a contradiction.
const ANTONYM_PAIRS: &[(&str, &str)] = &[
    ("like", "hate"),
    ("love", "hate"),
    ("prefer", "dislike"),
    ("good", "bad"),
    ("great", "terrible"),
    ("yes", "no"),
];

/// Past/present keyword pairs signalling a temporal update.
const TEMPORAL_PAIRS: &[(&str, &str)] = &[
    ("was", "am"),
    ("used to", "now"),
    ("before", "currently"),
    ("previously", "nowadays"),
];

/// Slot re-extraction patterns with per-slot confidence.
const SLOT_PATTERNS: &[(&str, &str, f64)] = &[
    ("name", r"my name is (\w+)", 0.95),
    ("location", r"i live in ([^,]+)", 0.9),
    ("employer", r"i work at ([^,]+)", 0.9),
];

const CONTRADICTION_CONFIDENCE: f64 = 0.9;
const TEMPORAL_UPDATE_CONFIDENCE: f64 = 0.8;

struct SlotPattern {
    slot: &'static str,
    regex: regex::Regex,
    confidence: f64,
}

/// Finds contradictory, superseded, and duplicate entries.
pub struct ConflictDetector {
    slots: Vec<SlotPattern>,
    duplicate_threshold: f64,
}

impl ConflictDetector {
    /// Compile the slot re-extraction patterns.
    pub fn new(config: &ConflictConfig) -> Result<Self, RecallError> {
        let slots = SLOT_PATTERNS
            .iter()
            .map(|(slot, pattern, confidence)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| SlotPattern {
                        slot,
                        regex,
                        confidence: *confidence,
                    })
                    .map_err(|e| RecallError::Pattern {
                        group: (*slot).to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, RecallError>>()?;

        Ok(Self {
            slots,
            duplicate_threshold: config.duplicate_threshold,
        })
    }

    /// Detect conflicts among all pairs of the given entries, in input
    /// order.
    pub fn detect(&self, entries: &[ContextEntry]) -> Vec<ConflictRecord> {
        let mut conflicts = Vec::new();
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let first = &entries[i];
                let second = &entries[j];

                if categories_incompatible(first.context_category, second.context_category) {
                    continue;
                }

                if let Some(record) = self.detect_pair(first, second) {
                    debug!(
                        first = %record.first.id,
                        second = %record.second.id,
                        conflict_type = %record.conflict_type,
                        "conflict detected"
                    );
                    conflicts.push(record);
                }
            }
        }
        conflicts
    }

    /// Run the three detectors in order, short-circuiting on the first hit.
    fn detect_pair(&self, first: &ContextEntry, second: &ContextEntry) -> Option<ConflictRecord> {
        self.detect_contradiction(first, second)
            .or_else(|| self.detect_update(first, second))
            .or_else(|| self.detect_duplicate(first, second))
    }

    fn detect_contradiction(
        &self,
        first: &ContextEntry,
        second: &ContextEntry,
    ) -> Option<ConflictRecord> {
        let content1 = first.content.to_lowercase();
        let content2 = second.content.to_lowercase();

        for (positive, negative) in ANTONYM_PAIRS {
            let one_per_side = (content1.contains(positive) && content2.contains(negative))
                || (content2.contains(positive) && content1.contains(negative));
            if one_per_side {
                return Some(ConflictRecord {
                    first: first.clone(),
                    second: second.clone(),
                    conflict_type: ConflictType::Contradiction,
                    confidence: CONTRADICTION_CONFIDENCE,
                    reasoning: format!("contradiction detected: '{positive}' vs '{negative}'"),
                    suggested_action: "keep the most recent or highest confidence entry"
                        .to_string(),
                });
            }
        }

        // Temporal markers describe a progression, not a contradiction:
        // the pair resolves as an update.
        for (past, present) in TEMPORAL_PAIRS {
            if content1.contains(past) && content2.contains(present) {
                return Some(ConflictRecord {
                    first: first.clone(),
                    second: second.clone(),
                    conflict_type: ConflictType::Update,
                    confidence: TEMPORAL_UPDATE_CONFIDENCE,
                    reasoning: format!("temporal conflict: past '{past}' vs present '{present}'"),
                    suggested_action: "merge as historical progression".to_string(),
                });
            }
        }

        None
    }

    fn detect_update(&self, first: &ContextEntry, second: &ContextEntry) -> Option<ConflictRecord> {
        for slot in &self.slots {
            let capture1 = slot
                .regex
                .captures(&first.content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_lowercase());
            let capture2 = slot
                .regex
                .captures(&second.content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_lowercase());

            if let (Some(value1), Some(value2)) = (capture1, capture2) {
                if value1 != value2 {
                    return Some(ConflictRecord {
                        first: first.clone(),
                        second: second.clone(),
                        conflict_type: ConflictType::Update,
                        confidence: slot.confidence,
                        reasoning: format!(
                            "{} conflict: '{value1}' vs '{value2}'",
                            slot.slot
                        ),
                        suggested_action: "keep the most recent entry".to_string(),
                    });
                }
            }
        }
        None
    }

    fn detect_duplicate(
        &self,
        first: &ContextEntry,
        second: &ContextEntry,
    ) -> Option<ConflictRecord> {
        let similarity = similarity_ratio(&first.content, &second.content);
        if similarity > self.duplicate_threshold {
            return Some(ConflictRecord {
                first: first.clone(),
                second: second.clone(),
                conflict_type: ConflictType::Duplicate,
                confidence: similarity,
                reasoning: format!("high similarity detected: {similarity:.2}"),
                suggested_action: "merge or remove duplicate".to_string(),
            });
        }
        None
    }
}

/// Direction-insensitive lookup in the incompatibility table.
fn categories_incompatible(a: ContextCategory, b: ContextCategory) -> bool {
    INCOMPATIBLE_CATEGORIES
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}
