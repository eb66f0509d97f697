// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-factor retrieval scoring.
//!
//! Given a query, ranks stored entries by a weighted combination of five
//! independent signals: lexical relevance, recency, stored confidence,
//! access frequency, and category relevance.
//!
//! 1. Analyze query intent (priority categories)
//! 2. Fetch candidates from the store, pre-sort by access count then
//!    creation recency, cap at `candidate_multiplier * max_results`
//! 3. Score every candidate
//! 4. Sort by total score (stable, so pre-sort order breaks ties), return
//!    the top `max_results`, and bump access stats for the returned set --
//!    the only mutation on the read path

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, warn};

use recall_classify::QueryIntentAnalyzer;
use recall_config::model::RetrievalConfig;
use recall_core::{ContextCategory, ContextEntry, ContextFilter, ContextStore, RecallError};

use crate::query::{RetrievalQuery, ScoredCandidate};

const RELEVANCE_WEIGHT: f64 = 0.4;
const RECENCY_WEIGHT: f64 = 0.2;
const CONFIDENCE_WEIGHT: f64 = 0.2;
const ACCESS_FREQUENCY_WEIGHT: f64 = 0.1;
const CATEGORY_RELEVANCE_WEIGHT: f64 = 0.1;

/// Boost when the full query appears verbatim in the content.
const PHRASE_BOOST: f64 = 0.3;

/// Boost per shared "important" word.
const IMPORTANT_WORD_BOOST: f64 = 0.1;

/// Words whose presence in both query and content is a strong signal.
const IMPORTANT_WORDS: &[&str] = &[
    "work", "job", "company", "name", "like", "prefer", "love", "hate",
];

/// Category pairs considered related (asymmetric, preserved as authored).
const RELATED_CATEGORIES: &[(ContextCategory, &[ContextCategory])] = &[
    (
        ContextCategory::PersonalInfo,
        &[ContextCategory::Work, ContextCategory::Personal],
    ),
    (
        ContextCategory::Preferences,
        &[ContextCategory::Personal, ContextCategory::Skills],
    ),
    (
        ContextCategory::Work,
        &[ContextCategory::Professional, ContextCategory::Projects],
    ),
    (
        ContextCategory::Skills,
        &[ContextCategory::Technical, ContextCategory::Work],
    ),
    (
        ContextCategory::Projects,
        &[ContextCategory::Work, ContextCategory::Goals],
    ),
    (
        ContextCategory::Goals,
        &[ContextCategory::Projects, ContextCategory::Personal],
    ),
];

/// Ranks stored entries against queries with multi-factor scoring.
pub struct RetrievalScorer {
    intent: QueryIntentAnalyzer,
    store: Arc<dyn ContextStore>,
    config: RetrievalConfig,
    token_pattern: Regex,
}

impl RetrievalScorer {
    pub fn new(
        intent: QueryIntentAnalyzer,
        store: Arc<dyn ContextStore>,
        config: RetrievalConfig,
    ) -> Result<Self, RecallError> {
        let token_pattern = Regex::new(r"\w+").map_err(|e| RecallError::Pattern {
            group: "tokens".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            intent,
            store,
            config,
            token_pattern,
        })
    }

    /// Build a query from free text, deriving intent and categories.
    pub fn build_query(&self, text: &str, user_id: Option<&str>) -> RetrievalQuery {
        let (intent_type, categories) = self.intent.analyze(text);
        RetrievalQuery {
            text: text.to_string(),
            intent_type,
            categories,
            max_results: self.config.max_results,
            min_confidence: self.config.min_confidence,
            include_disputed: self.config.include_disputed,
            user_id: user_id.map(String::from),
        }
    }

    /// Retrieve and rank entries for a query.
    pub async fn retrieve(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<ScoredCandidate>, RecallError> {
        let candidates = self.fetch_candidates(query).await?;
        debug!(
            intent = %query.intent_type,
            candidates = candidates.len(),
            "scoring retrieval candidates"
        );

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|entry| self.score(entry, query))
            .collect();

        // Stable sort: ties keep the pre-scoring order (access count, then
        // recency), making results deterministic.
        scored.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(query.max_results);

        // The only mutation on the read path. Best-effort: a failed bump
        // must not fail the retrieval.
        for candidate in &scored {
            if let Err(e) = self.store.increment_access(&candidate.entry.id).await {
                warn!(id = %candidate.entry.id, error = %e, "access stat update failed");
            }
        }

        Ok(scored)
    }

    /// Convenience wrapper: build the query from text and retrieve.
    pub async fn retrieve_text(
        &self,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<ScoredCandidate>, RecallError> {
        let query = self.build_query(text, user_id);
        self.retrieve(&query).await
    }

    /// Fetch candidates, pre-sorted by access count then creation recency,
    /// capped before scoring.
    async fn fetch_candidates(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<ContextEntry>, RecallError> {
        let filter = ContextFilter {
            categories: query.categories.clone(),
            min_confidence: query.min_confidence,
            include_disputed: query.include_disputed,
            limit: None,
        };
        let mut entries = self.store.find(query.user_id.as_deref(), &filter).await?;

        entries.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        entries.truncate(self.config.candidate_multiplier * query.max_results);
        Ok(entries)
    }

    fn score(&self, entry: ContextEntry, query: &RetrievalQuery) -> ScoredCandidate {
        let mut match_reasons = Vec::new();

        let relevance = self.relevance_score(&entry.content, &query.text);
        if relevance > 0.5 {
            match_reasons.push(format!("text similarity: {relevance:.2}"));
        }

        let recency = recency_score(entry.age_days(Utc::now()));
        if recency > 0.7 {
            match_reasons.push(format!("recent context: {recency:.2}"));
        }

        let confidence = entry.confidence_score;
        if confidence > 0.8 {
            match_reasons.push(format!("high confidence: {confidence:.2}"));
        }

        let access_frequency = access_frequency_score(entry.access_count);
        if access_frequency > 0.5 {
            match_reasons.push(format!("frequently accessed: {access_frequency:.2}"));
        }

        let category_relevance =
            category_relevance_score(entry.context_category, &query.categories);
        if category_relevance > 0.7 {
            match_reasons.push(format!("category match: {category_relevance:.2}"));
        }

        let total_score = relevance * RELEVANCE_WEIGHT
            + recency * RECENCY_WEIGHT
            + confidence * CONFIDENCE_WEIGHT
            + access_frequency * ACCESS_FREQUENCY_WEIGHT
            + category_relevance * CATEGORY_RELEVANCE_WEIGHT;

        ScoredCandidate {
            entry,
            relevance,
            recency,
            confidence,
            access_frequency,
            category_relevance,
            total_score,
            match_reasons,
        }
    }

    /// Jaccard token similarity with phrase and important-word boosts,
    /// capped at 1.0.
    fn relevance_score(&self, content: &str, query: &str) -> f64 {
        let content_lower = content.to_lowercase();
        let query_lower = query.to_lowercase();

        let query_words: HashSet<&str> = self
            .token_pattern
            .find_iter(&query_lower)
            .map(|m| m.as_str())
            .collect();
        let content_words: HashSet<&str> = self
            .token_pattern
            .find_iter(&content_lower)
            .map(|m| m.as_str())
            .collect();

        if query_words.is_empty() {
            return 0.0;
        }

        let intersection = query_words.intersection(&content_words).count();
        let union = query_words.union(&content_words).count();
        if union == 0 {
            return 0.0;
        }
        let mut score = intersection as f64 / union as f64;

        if content_lower.contains(&query_lower) {
            score += PHRASE_BOOST;
        }

        let important_matches = IMPORTANT_WORDS
            .iter()
            .filter(|w| query_words.contains(**w) && content_words.contains(**w))
            .count();
        score += important_matches as f64 * IMPORTANT_WORD_BOOST;

        score.min(1.0)
    }
}

/// Step function of entry age in days.
fn recency_score(age_days: i64) -> f64 {
    if age_days <= 1 {
        1.0
    } else if age_days <= 7 {
        0.9
    } else if age_days <= 30 {
        0.7
    } else if age_days <= 90 {
        0.5
    } else if age_days <= 365 {
        0.3
    } else {
        0.1
    }
}

/// Step function of access count.
fn access_frequency_score(access_count: u64) -> f64 {
    if access_count == 0 {
        0.0
    } else if access_count <= 5 {
        0.3
    } else if access_count <= 20 {
        0.6
    } else if access_count <= 50 {
        0.8
    } else {
        1.0
    }
}

/// 1.0 for a direct category hit, 0.7 for a related category, 0.0
/// otherwise. An empty query category set is neutral (0.5).
fn category_relevance_score(
    category: ContextCategory,
    query_categories: &[ContextCategory],
) -> f64 {
    if query_categories.is_empty() {
        return 0.5;
    }
    if query_categories.contains(&category) {
        return 1.0;
    }
    let related = RELATED_CATEGORIES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, related)| *related)
        .unwrap_or(&[]);
    if related.iter().any(|c| query_categories.contains(c)) {
        0.7
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use recall_core::ValidationStatus;
    use recall_test_utils::MemoryStore;

    use super::*;

    fn entry(
        content: &str,
        category: ContextCategory,
        access_count: u64,
        confidence: f64,
    ) -> ContextEntry {
        let mut entry = ContextEntry::new_manual(content);
        entry.context_category = category;
        entry.access_count = access_count;
        entry.set_confidence(confidence);
        entry
    }

    fn scorer(entries: Vec<ContextEntry>) -> (RetrievalScorer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::seeded(entries));
        let scorer = RetrievalScorer::new(
            QueryIntentAnalyzer::new().unwrap(),
            store.clone(),
            RetrievalConfig::default(),
        )
        .unwrap();
        (scorer, store)
    }

    #[tokio::test]
    async fn hobby_query_ranks_preference_entry_first() {
        let hiking = entry("I love hiking", ContextCategory::Preferences, 20, 0.9);
        let acme = entry("I work at Acme", ContextCategory::Work, 2, 0.9);
        let (scorer, _) = scorer(vec![acme, hiking.clone()]);

        let results = scorer
            .retrieve_text("What are my hobbies?", None)
            .await
            .unwrap();
        assert_eq!(results[0].entry.id, hiking.id);
    }

    #[tokio::test]
    async fn increasing_confidence_never_decreases_total() {
        let low = entry("I love hiking", ContextCategory::Preferences, 5, 0.4);
        let mut high = low.clone();
        high.set_confidence(0.9);

        let (scorer, _) = scorer(vec![]);
        let query = scorer.build_query("What are my hobbies?", None);
        let low_scored = scorer.score(low, &query);
        let high_scored = scorer.score(high, &query);
        assert!(high_scored.total_score >= low_scored.total_score);
    }

    #[tokio::test]
    async fn verbatim_phrase_boosts_relevance() {
        let (scorer, _) = scorer(vec![]);
        let with_phrase = scorer.relevance_score("my favorite color is blue", "favorite color");
        let without_phrase = scorer.relevance_score("my favorite shade is blue", "favorite color");
        assert!(with_phrase > without_phrase);
    }

    #[tokio::test]
    async fn important_word_overlap_boosts_relevance() {
        let (scorer, _) = scorer(vec![]);
        let important = scorer.relevance_score("I work at Acme", "where do I work");
        let plain = scorer.relevance_score("I shop at Acme", "where do I shop");
        assert!(important > plain);
    }

    #[test]
    fn recency_is_a_step_function() {
        assert_eq!(recency_score(0), 1.0);
        assert_eq!(recency_score(1), 1.0);
        assert_eq!(recency_score(7), 0.9);
        assert_eq!(recency_score(30), 0.7);
        assert_eq!(recency_score(90), 0.5);
        assert_eq!(recency_score(365), 0.3);
        assert_eq!(recency_score(400), 0.1);
    }

    #[test]
    fn access_frequency_is_a_step_function() {
        assert_eq!(access_frequency_score(0), 0.0);
        assert_eq!(access_frequency_score(5), 0.3);
        assert_eq!(access_frequency_score(20), 0.6);
        assert_eq!(access_frequency_score(50), 0.8);
        assert_eq!(access_frequency_score(51), 1.0);
    }

    #[test]
    fn category_relevance_uses_related_table() {
        let query = vec![ContextCategory::Preferences, ContextCategory::Personal];
        assert_eq!(
            category_relevance_score(ContextCategory::Preferences, &query),
            1.0
        );
        // Goals is related to Personal.
        assert_eq!(category_relevance_score(ContextCategory::Goals, &query), 0.7);
        assert_eq!(
            category_relevance_score(ContextCategory::Technical, &query),
            0.0
        );
        assert_eq!(category_relevance_score(ContextCategory::Other, &[]), 0.5);
    }

    #[tokio::test]
    async fn retrieval_bumps_access_stats_for_returned_set_only() {
        let hiking = entry("I love hiking", ContextCategory::Preferences, 0, 0.9);
        let hiking_id = hiking.id.clone();
        let (scorer, store) = scorer(vec![hiking]);

        scorer
            .retrieve_text("What are my hobbies?", None)
            .await
            .unwrap();

        let stored = store.get(&hiking_id).await.unwrap().unwrap();
        assert_eq!(stored.access_count, 1);
        assert!(stored.last_accessed_at.is_some());
    }

    #[tokio::test]
    async fn disputed_entries_are_excluded_by_default() {
        let mut disputed = entry("I love hiking", ContextCategory::Preferences, 0, 0.9);
        disputed.validation_status = ValidationStatus::Disputed;
        let (scorer, _) = scorer(vec![disputed]);

        let results = scorer
            .retrieve_text("What are my hobbies?", None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn results_are_capped_at_max_results() {
        let entries: Vec<ContextEntry> = (0..40)
            .map(|i| {
                let mut e = entry(
                    &format!("I love hobby number {i}"),
                    ContextCategory::Preferences,
                    i as u64,
                    0.9,
                );
                e.created_at = Utc::now() - Duration::days(i);
                e.updated_at = e.created_at;
                e
            })
            .collect();
        let (scorer, _) = scorer(entries);

        let results = scorer
            .retrieve_text("What are my hobbies?", None)
            .await
            .unwrap();
        assert_eq!(results.len(), RetrievalConfig::default().max_results);
    }

    #[tokio::test]
    async fn ties_keep_prescore_order() {
        // Two identical entries except access count; identical total scores
        // fall back to the pre-scoring sort (higher access count first).
        let mut a = entry("I love hiking", ContextCategory::Preferences, 3, 0.9);
        let b = entry("I love hiking", ContextCategory::Preferences, 1, 0.9);
        a.created_at = b.created_at;
        a.updated_at = b.updated_at;

        let (scorer, _) = scorer(vec![b.clone(), a.clone()]);
        let results = scorer
            .retrieve_text("What are my hobbies?", None)
            .await
            .unwrap();
        // access counts 3 and 1 both map to the same step score (0.3), so
        // the totals tie and pre-sort order decides.
        assert_eq!(results[0].entry.id, a.id);
    }
}
