// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality gate for extracted candidates before persistence.
//!
//! Four independent checks each contribute a signed confidence delta:
//! basic quality (length, degenerate content), content quality (specificity
//! vs. hedging), type-content consistency, and an extraction-confidence
//! cross-check. The deltas are averaged and clamped to [0, 1]; thresholds
//! then map confidence + issue count to a status. Only `Valid` and
//! `NeedsReview` candidates are eligible for persistence.

use regex::RegexBuilder;

use recall_config::model::ValidatorConfig;
use recall_core::{ContextType, RecallError};

use crate::candidate::{ExtractedCandidate, ExtractionConfidence};

/// Validation verdict for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStatus {
    Valid,
    NeedsReview,
    Uncertain,
    Invalid,
}

impl CandidateStatus {
    /// Whether a candidate with this status may be persisted.
    pub fn is_persistable(&self) -> bool {
        matches!(self, CandidateStatus::Valid | CandidateStatus::NeedsReview)
    }
}

/// Result of validating one candidate.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub status: CandidateStatus,
    /// Averaged, clamped check confidence in [0, 1].
    pub confidence: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Content shapes that are rejected outright.
const BLACKLIST_PATTERNS: &[&str] = &[
    r"^\s*$",        // empty or whitespace only
    r"^[^a-zA-Z]*$", // no letters
    r"^\d+$",        // only digits
    r"^[^\w\s]*$",   // only punctuation
];

/// Markers that raise content quality, by family.
const QUALITY_INDICATORS: &[(&str, &str)] = &[
    ("specific", r"\b(?:specifically|exactly|precisely|definitely)\b"),
    ("certain", r"\b(?:always|never|certainly|absolutely)\b"),
    ("personal", r"\b(?:i|my|me|myself)\b"),
    ("factual", r"\b(?:i am|i have|i work|i live|my name is)\b"),
];

/// Hedging markers that lower content quality.
const RED_FLAGS: &[&str] = &[
    r"\b(?:maybe|perhaps|might|could|possibly)\b", // uncertainty
    r"\b(?:i think|i believe|in my opinion)\b",    // opinion vs fact
    r"\b(?:sometimes|often|usually|rarely)\b",     // vague frequency
];

/// Keyword families expected for each declared context type.
const TYPE_INDICATORS: &[(ContextType, &[&str])] = &[
    (
        ContextType::Preference,
        &["prefer", "like", "love", "favorite", "best", "worst", "hate"],
    ),
    (
        ContextType::Note,
        &["i am", "i have", "i work", "i live", "my name is", "fact"],
    ),
    (ContextType::Text, &["information", "details", "about"]),
    (
        ContextType::Event,
        &["happened", "occurred", "event", "meeting", "appointment"],
    ),
    (
        ContextType::File,
        &["document", "file", "attachment", "report"],
    ),
];

/// Quality-gates extracted candidates.
pub struct Validator {
    min_length: usize,
    max_length: usize,
    blacklist: Vec<regex::Regex>,
    quality_indicators: Vec<regex::Regex>,
    red_flags: Vec<regex::Regex>,
}

fn compile_patterns(
    group: &'static str,
    patterns: &[&str],
) -> Result<Vec<regex::Regex>, RecallError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| RecallError::Pattern {
                    group: group.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

impl Validator {
    /// Compile the validation pattern tables.
    pub fn new(config: &ValidatorConfig) -> Result<Self, RecallError> {
        let quality: Vec<&str> = QUALITY_INDICATORS.iter().map(|(_, p)| *p).collect();
        Ok(Self {
            min_length: config.min_length,
            max_length: config.max_length,
            blacklist: compile_patterns("blacklist", BLACKLIST_PATTERNS)?,
            quality_indicators: compile_patterns("quality", &quality)?,
            red_flags: compile_patterns("red_flags", RED_FLAGS)?,
        })
    }

    /// Validate a single candidate.
    pub fn validate(&self, candidate: &ExtractedCandidate) -> ValidationOutcome {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        let mut total_delta = 0.0;

        total_delta += self.check_basic_quality(candidate, &mut issues, &mut suggestions);
        total_delta += self.check_content_quality(candidate, &mut issues, &mut suggestions);
        total_delta += self.check_type_consistency(candidate, &mut suggestions);
        total_delta += self.check_extraction_confidence(candidate, &mut issues, &mut suggestions);

        let confidence = (total_delta / 4.0).clamp(0.0, 1.0);
        let status = determine_status(confidence, issues.len());

        ValidationOutcome {
            status,
            confidence,
            issues,
            suggestions,
        }
    }

    /// Validate a batch, preserving order.
    pub fn validate_batch(&self, candidates: &[ExtractedCandidate]) -> Vec<ValidationOutcome> {
        candidates.iter().map(|c| self.validate(c)).collect()
    }

    fn check_basic_quality(
        &self,
        candidate: &ExtractedCandidate,
        issues: &mut Vec<String>,
        _suggestions: &mut [String],
    ) -> f64 {
        let content = candidate.content.trim();
        let mut delta = 0.0;

        if content.len() < self.min_length {
            issues.push(format!(
                "content too short ({} chars, minimum {})",
                content.len(),
                self.min_length
            ));
            delta -= 0.3;
        } else if content.len() > self.max_length {
            issues.push(format!(
                "content too long ({} chars, maximum {})",
                content.len(),
                self.max_length
            ));
            delta -= 0.1;
        } else {
            delta += 0.2;
        }

        for pattern in &self.blacklist {
            if pattern.is_match(content) {
                issues.push(format!("content matches blacklisted pattern: {pattern}"));
                delta -= 0.5;
            }
        }

        if content.split_whitespace().count() < 2 {
            issues.push("content has too few words".to_string());
            delta -= 0.2;
        } else {
            delta += 0.1;
        }

        delta
    }

    fn check_content_quality(
        &self,
        candidate: &ExtractedCandidate,
        issues: &mut Vec<String>,
        suggestions: &mut Vec<String>,
    ) -> f64 {
        let content = candidate.content.to_lowercase();
        let mut delta = 0.0;

        let quality_hits = self
            .quality_indicators
            .iter()
            .filter(|p| p.is_match(&content))
            .count();
        delta += quality_hits as f64 * 0.1;
        if quality_hits == 0 {
            suggestions.push("content could be more specific or personal".to_string());
        }

        let red_flag_hits = self
            .red_flags
            .iter()
            .filter(|p| p.is_match(&content))
            .count();
        delta -= red_flag_hits as f64 * 0.1;
        if red_flag_hits > 0 {
            issues.push(format!(
                "content contains {red_flag_hits} uncertainty indicators"
            ));
            suggestions.push("consider if this is factual information or opinion".to_string());
        }

        if !candidate.content.chars().any(|c| c.is_uppercase()) {
            suggestions.push("consider proper capitalization".to_string());
        }

        if !looks_complete(&candidate.content) {
            suggestions.push("content might be incomplete".to_string());
            delta -= 0.1;
        }

        delta
    }

    fn check_type_consistency(
        &self,
        candidate: &ExtractedCandidate,
        suggestions: &mut Vec<String>,
    ) -> f64 {
        let content = candidate.content.to_lowercase();
        let expected = TYPE_INDICATORS
            .iter()
            .find(|(t, _)| *t == candidate.context_type)
            .map(|(_, indicators)| *indicators);

        match expected {
            Some(indicators) => {
                if indicators.iter().any(|i| content.contains(i)) {
                    0.2
                } else {
                    suggestions.push(format!(
                        "content doesn't seem to match context type '{}'",
                        candidate.context_type
                    ));
                    -0.1
                }
            }
            // Types with no declared indicator family are not penalized.
            None => 0.0,
        }
    }

    fn check_extraction_confidence(
        &self,
        candidate: &ExtractedCandidate,
        issues: &mut Vec<String>,
        suggestions: &mut Vec<String>,
    ) -> f64 {
        let mut delta = 0.0;

        match candidate.confidence {
            ExtractionConfidence::High => delta += 0.3,
            ExtractionConfidence::Medium => delta += 0.1,
            ExtractionConfidence::Low => {
                issues.push("low extraction confidence".to_string());
                suggestions.push("review extraction accuracy".to_string());
                delta -= 0.1;
            }
        }

        let quality = self.assess_content_quality(&candidate.content);
        if candidate.confidence == ExtractionConfidence::High && quality < 0.5 {
            issues.push("high extraction confidence but low content quality".to_string());
            suggestions.push("verify extraction accuracy".to_string());
            delta -= 0.2;
        }

        delta
    }

    /// Rough content quality in [0, 1] from length, word count, and quality
    /// indicator density.
    fn assess_content_quality(&self, content: &str) -> f64 {
        let mut score = 0.0;

        score += if (10..=200).contains(&content.len()) {
            0.3
        } else if content.len() < 10 {
            0.1
        } else {
            0.2
        };

        let word_count = content.split_whitespace().count();
        score += if (3..=50).contains(&word_count) { 0.3 } else { 0.1 };

        let lowered = content.to_lowercase();
        let hits = self
            .quality_indicators
            .iter()
            .filter(|p| p.is_match(&lowered))
            .count();
        score += (hits as f64 * 0.1).min(0.4);

        score.min(1.0)
    }
}

/// Heuristic completeness: terminal punctuation, at least three words, and
/// no trailing-off markers.
fn looks_complete(content: &str) -> bool {
    let content = content.trim();

    if !content.ends_with(['.', '!', '?']) {
        return false;
    }

    if content.split_whitespace().count() < 3 {
        return false;
    }

    let lowered = content.to_lowercase();
    const INCOMPLETE_MARKERS: &[&str] = &["...", "etc", "and so on"];
    !INCOMPLETE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Map confidence and issue count to a validation status.
fn determine_status(confidence: f64, issue_count: usize) -> CandidateStatus {
    if confidence >= 0.5 && issue_count == 0 {
        CandidateStatus::Valid
    } else if confidence >= 0.3 && issue_count <= 3 {
        CandidateStatus::NeedsReview
    } else if confidence >= 0.1 {
        CandidateStatus::Uncertain
    } else {
        CandidateStatus::Invalid
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use recall_core::ContextType;

    use super::*;
    use crate::candidate::CandidateSource;

    fn validator() -> Validator {
        Validator::new(&ValidatorConfig::default()).unwrap()
    }

    fn candidate(
        content: &str,
        context_type: ContextType,
        confidence: ExtractionConfidence,
    ) -> ExtractedCandidate {
        ExtractedCandidate {
            content: content.to_string(),
            context_type,
            confidence,
            source: CandidateSource::UserPrompt,
            conversation_id: "conv-1".to_string(),
            message_id: "msg-1".to_string(),
            tags: vec![],
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn solid_factual_candidate_collects_no_issues() {
        let outcome = validator().validate(&candidate(
            "I am definitely a software engineer and I work at Acme.",
            ContextType::Note,
            ExtractionConfidence::High,
        ));
        assert!(outcome.issues.is_empty());
        assert!(outcome.status != CandidateStatus::Invalid);
        // The four deltas average out well below 1.0 even for good content;
        // the mapping is intentionally conservative.
        assert!(outcome.confidence > 0.2);
    }

    #[test]
    fn stronger_content_scores_higher_than_hedged_content() {
        let v = validator();
        let strong = v.validate(&candidate(
            "I am definitely a software engineer and I work at Acme.",
            ContextType::Note,
            ExtractionConfidence::High,
        ));
        let hedged = v.validate(&candidate(
            "maybe I sometimes work somewhere, perhaps",
            ContextType::Note,
            ExtractionConfidence::Low,
        ));
        assert!(strong.confidence > hedged.confidence);
    }

    #[test]
    fn empty_content_is_invalid() {
        let outcome = validator().validate(&candidate(
            "",
            ContextType::Note,
            ExtractionConfidence::Low,
        ));
        assert_eq!(outcome.status, CandidateStatus::Invalid);
        assert!(!outcome.issues.is_empty());
    }

    #[test]
    fn digits_only_content_is_invalid() {
        let outcome = validator().validate(&candidate(
            "12345",
            ContextType::Note,
            ExtractionConfidence::Low,
        ));
        assert_eq!(outcome.status, CandidateStatus::Invalid);
    }

    #[test]
    fn hedged_content_collects_issues() {
        let outcome = validator().validate(&candidate(
            "maybe I sometimes think this could be true",
            ContextType::Note,
            ExtractionConfidence::Low,
        ));
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.contains("uncertainty indicators")));
        assert!(!outcome.status.is_persistable() || outcome.status == CandidateStatus::NeedsReview);
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let outcome = validator().validate(&candidate(
            "",
            ContextType::Note,
            ExtractionConfidence::Low,
        ));
        assert!(outcome.confidence >= 0.0);

        let outcome = validator().validate(&candidate(
            "I am absolutely certain: my name is Sam and I live in Austin.",
            ContextType::Note,
            ExtractionConfidence::High,
        ));
        assert!(outcome.confidence <= 1.0);
    }

    #[test]
    fn type_mismatch_yields_suggestion() {
        let outcome = validator().validate(&candidate(
            "The quarterly numbers improved dramatically.",
            ContextType::Preference,
            ExtractionConfidence::Medium,
        ));
        assert!(outcome
            .suggestions
            .iter()
            .any(|s| s.contains("context type")));
    }

    #[test]
    fn high_confidence_with_poor_content_is_cross_checked() {
        let outcome = validator().validate(&candidate(
            "ok then",
            ContextType::Note,
            ExtractionConfidence::High,
        ));
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.contains("low content quality")));
    }

    #[test]
    fn incomplete_sentence_yields_suggestion() {
        let outcome = validator().validate(&candidate(
            "I work at Acme and",
            ContextType::Note,
            ExtractionConfidence::Medium,
        ));
        assert!(outcome
            .suggestions
            .iter()
            .any(|s| s.contains("incomplete")));
    }

    #[test]
    fn status_mapping_thresholds() {
        assert_eq!(determine_status(0.6, 0), CandidateStatus::Valid);
        assert_eq!(determine_status(0.6, 1), CandidateStatus::NeedsReview);
        assert_eq!(determine_status(0.35, 3), CandidateStatus::NeedsReview);
        assert_eq!(determine_status(0.35, 4), CandidateStatus::Uncertain);
        assert_eq!(determine_status(0.15, 5), CandidateStatus::Uncertain);
        assert_eq!(determine_status(0.05, 2), CandidateStatus::Invalid);
    }

    #[test]
    fn only_valid_and_needs_review_are_persistable() {
        assert!(CandidateStatus::Valid.is_persistable());
        assert!(CandidateStatus::NeedsReview.is_persistable());
        assert!(!CandidateStatus::Uncertain.is_persistable());
        assert!(!CandidateStatus::Invalid.is_persistable());
    }

    #[test]
    fn batch_validation_preserves_order() {
        let batch = vec![
            candidate("", ContextType::Note, ExtractionConfidence::Low),
            candidate(
                "I am definitely a software engineer and I work at Acme.",
                ContextType::Note,
                ExtractionConfidence::High,
            ),
        ];
        let outcomes = validator().validate_batch(&batch);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, CandidateStatus::Invalid);
        assert_eq!(outcomes[1].status, CandidateStatus::Valid);
    }
}
