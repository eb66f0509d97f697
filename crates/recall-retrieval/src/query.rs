// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral retrieval types: one query and its scored candidates.

use recall_classify::IntentType;
use recall_core::{ContextCategory, ContextEntry};

/// A context retrieval query with derived intent analysis.
///
/// Ephemeral: one per retrieval call, never persisted.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub text: String,
    pub intent_type: IntentType,
    /// Priority categories derived from the intent.
    pub categories: Vec<ContextCategory>,
    pub max_results: usize,
    pub min_confidence: f64,
    pub include_disputed: bool,
    pub user_id: Option<String>,
}

/// A context entry scored against one query.
///
/// Exists only for the duration of one retrieval call.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub entry: ContextEntry,
    pub relevance: f64,
    pub recency: f64,
    pub confidence: f64,
    pub access_frequency: f64,
    pub category_relevance: f64,
    /// Weighted combination of the five sub-scores.
    pub total_score: f64,
    /// Human-readable reasons this entry matched.
    pub match_reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_carries_derived_intent() {
        let query = RetrievalQuery {
            text: "what are my hobbies?".to_string(),
            intent_type: IntentType::Preferences,
            categories: vec![ContextCategory::Preferences, ContextCategory::Personal],
            max_results: 10,
            min_confidence: 0.3,
            include_disputed: false,
            user_id: None,
        };
        assert_eq!(query.intent_type, IntentType::Preferences);
        assert_eq!(query.categories.len(), 2);
    }
}
