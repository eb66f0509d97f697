// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deduplication of extracted candidates.
//!
//! Candidates similar to an existing stored entry are dropped; the
//! remainder are clustered against each other (single-link, first similar
//! cluster wins) and each cluster collapses into one merged candidate.
//! This stage only filters and merges the incoming batch; it never touches
//! the store.

use recall_config::model::DedupConfig;
use tracing::debug;

use crate::candidate::ExtractedCandidate;

/// Similarity ratio between two texts after normalization.
///
/// Normalization lowercases, strips punctuation, and collapses whitespace;
/// the ratio is a normalized Levenshtein similarity in [0, 1]. The conflict
/// detector reuses this exact metric for duplicate detection.
///
/// Computed as `(max_len - distance) / max_len` rather than
/// `1 - distance / max_len`: the former lands exactly on representable
/// ratios like 4/5, keeping the inclusive threshold comparison exact.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes and merges near-duplicate candidates.
pub struct Deduplicator {
    similarity_threshold: f64,
}

impl Deduplicator {
    /// Create a deduplicator from the configured threshold.
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
        }
    }

    /// Deduplicate a batch against existing stored contents, then merge
    /// near-duplicates within the batch itself.
    ///
    /// The threshold is inclusive: a ratio of exactly
    /// `similarity_threshold` counts as a duplicate. Empty and
    /// single-candidate batches pass through unchanged.
    pub fn dedup(
        &self,
        batch: Vec<ExtractedCandidate>,
        existing_contents: &[String],
    ) -> Vec<ExtractedCandidate> {
        let fresh: Vec<ExtractedCandidate> = batch
            .into_iter()
            .filter(|candidate| {
                let duplicate = existing_contents.iter().any(|existing| {
                    similarity_ratio(&candidate.content, existing) >= self.similarity_threshold
                });
                if duplicate {
                    debug!(content = %candidate.content, "dropped duplicate of stored entry");
                }
                !duplicate
            })
            .collect();

        self.merge_similar(fresh)
    }

    /// Single-link clustering: each candidate joins the first existing
    /// cluster it is similar to, then each cluster collapses to one
    /// candidate.
    fn merge_similar(&self, candidates: Vec<ExtractedCandidate>) -> Vec<ExtractedCandidate> {
        if candidates.len() <= 1 {
            return candidates;
        }

        let mut clusters: Vec<Vec<ExtractedCandidate>> = Vec::new();
        for candidate in candidates {
            let home = clusters.iter_mut().find(|cluster| {
                similarity_ratio(&cluster[0].content, &candidate.content)
                    >= self.similarity_threshold
            });
            match home {
                Some(cluster) => cluster.push(candidate),
                None => clusters.push(vec![candidate]),
            }
        }

        clusters
            .into_iter()
            .map(|cluster| self.collapse_cluster(cluster))
            .collect()
    }

    /// Collapse a cluster: highest-confidence member becomes the base, the
    /// longest (most complete) member's content wins, tags union, and merge
    /// provenance is stamped.
    fn collapse_cluster(&self, mut cluster: Vec<ExtractedCandidate>) -> ExtractedCandidate {
        if cluster.len() > 1 {
            let base_index = cluster
                .iter()
                .enumerate()
                .max_by_key(|(i, c)| (c.confidence.rank(), std::cmp::Reverse(*i)))
                .map(|(i, _)| i)
                .unwrap_or(0);

            let longest = cluster
                .iter()
                .map(|c| c.content.clone())
                .max_by_key(|content| content.len())
                .unwrap_or_default();

            let member_ids: Vec<serde_json::Value> = cluster
                .iter()
                .map(|c| serde_json::Value::String(c.message_id.clone()))
                .collect();
            let merge_count = cluster.len();

            let mut tags: Vec<String> = Vec::new();
            for candidate in &cluster {
                for tag in &candidate.tags {
                    if !tags.iter().any(|t| t == tag) {
                        tags.push(tag.clone());
                    }
                }
            }

            let mut merged = cluster.swap_remove(base_index);
            merged.content = longest;
            merged.tags = tags;
            merged.metadata.insert(
                "merged_from".to_string(),
                serde_json::Value::Array(member_ids),
            );
            merged.metadata.insert(
                "merge_count".to_string(),
                serde_json::Value::Number(merge_count.into()),
            );
            return merged;
        }
        // Clusters are built non-empty; a singleton passes through as-is.
        cluster.swap_remove(0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use recall_core::ContextType;

    use super::*;
    use crate::candidate::{CandidateSource, ExtractionConfidence};

    fn candidate(content: &str, confidence: ExtractionConfidence) -> ExtractedCandidate {
        ExtractedCandidate {
            content: content.to_string(),
            context_type: ContextType::Preference,
            confidence,
            source: CandidateSource::UserPrompt,
            conversation_id: "conv-1".to_string(),
            message_id: format!("msg-{content}"),
            tags: vec!["auto_extracted".to_string()],
            metadata: HashMap::new(),
        }
    }

    fn dedup() -> Deduplicator {
        Deduplicator::new(&DedupConfig::default())
    }

    #[test]
    fn threshold_is_inclusive_at_exactly_080() {
        // Normalized Levenshtein: one edit over five chars = 0.8 exactly.
        assert_eq!(similarity_ratio("aaaaa", "aaaab"), 0.8);
        let batch = vec![candidate("aaaaa", ExtractionConfidence::Medium)];
        let existing = vec!["aaaab".to_string()];
        assert!(dedup().dedup(batch, &existing).is_empty());
    }

    #[test]
    fn below_threshold_survives() {
        // Two edits over ten chars = 0.8; three edits = 0.7, below threshold.
        assert!(similarity_ratio("aaaaaaaaaa", "aaaaaaabbb") < 0.8);
        let batch = vec![candidate("aaaaaaaaaa", ExtractionConfidence::Medium)];
        let existing = vec!["aaaaaaabbb".to_string()];
        assert_eq!(dedup().dedup(batch, &existing).len(), 1);
    }

    #[test]
    fn normalization_ignores_case_punctuation_whitespace() {
        assert_eq!(similarity_ratio("I like   Python!", "i like python"), 1.0);
    }

    #[test]
    fn near_identical_candidates_merge_to_one() {
        let batch = vec![
            candidate("I like Python programm", ExtractionConfidence::Medium),
            candidate("I like Python programming", ExtractionConfidence::High),
        ];
        let merged = dedup().dedup(batch, &[]);
        assert_eq!(merged.len(), 1);
        // Longest content wins; highest-confidence member is the base.
        assert_eq!(merged[0].content, "I like Python programming");
        assert_eq!(merged[0].confidence, ExtractionConfidence::High);
        assert_eq!(merged[0].metadata["merge_count"], serde_json::json!(2));
        assert_eq!(
            merged[0].metadata["merged_from"]
                .as_array()
                .map(|a| a.len()),
            Some(2)
        );
    }

    #[test]
    fn merged_tags_are_the_union() {
        let mut a = candidate("I like Python programm", ExtractionConfidence::Medium);
        a.tags = vec!["preference".to_string(), "auto_extracted".to_string()];
        let mut b = candidate("I like Python programming", ExtractionConfidence::Low);
        b.tags = vec!["interests".to_string(), "auto_extracted".to_string()];

        let merged = dedup().dedup(vec![a, b], &[]);
        assert_eq!(merged.len(), 1);
        for tag in ["preference", "auto_extracted", "interests"] {
            assert!(merged[0].tags.iter().any(|t| t == tag), "missing tag {tag}");
        }
    }

    #[test]
    fn dissimilar_candidates_pass_through() {
        let batch = vec![
            candidate("I like Python", ExtractionConfidence::Medium),
            candidate("My name is Sam", ExtractionConfidence::Medium),
        ];
        assert_eq!(dedup().dedup(batch, &[]).len(), 2);
    }

    #[test]
    fn degenerate_batches_pass_through() {
        assert!(dedup().dedup(vec![], &[]).is_empty());

        let single = vec![candidate("I like Python", ExtractionConfidence::Low)];
        let out = dedup().dedup(single, &[]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].metadata.contains_key("merge_count"));
    }
}
