// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automatic categorization of context content.
//!
//! Scores content against per-category and per-type pattern tables, derives
//! suggested tags from domain matches and token frequency, and reports a
//! combined confidence. Deterministic: identical content always yields an
//! identical result. Used both at extraction time and for on-demand
//! re-categorization of stored entries.

use std::collections::HashMap;
use std::str::FromStr;

use regex::Regex;

use recall_core::{ContextCategory, ContextEntry, ContextType, RecallError};

use crate::patterns::PatternSet;

/// Confidence offset added on top of the hit ratio for category matches.
const CATEGORY_BASE_OFFSET: f64 = 0.2;

/// Confidence offset added on top of the hit ratio for type matches.
const TYPE_BASE_OFFSET: f64 = 0.3;

/// Confidence reported when nothing matched and the fallback is used.
const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Maximum number of suggested tags.
const MAX_TAGS: usize = 5;

/// Tokens never suggested as tags.
const STOPWORDS: &[&str] = &[
    "that", "this", "with", "from", "they", "have", "been", "will", "would", "could", "should",
];

/// First-person declarative markers hinting at auto-extractable content.
const FIRST_PERSON_MARKERS: &[&str] = &["i am", "i work", "i like", "my name"];

/// Category pattern table. Group names parse back into [`ContextCategory`].
const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "PersonalInfo",
        &[
            r"my name is",
            r"i am",
            r"i'm",
            r"i live in",
            r"i work at",
            r"i was born",
            r"my age is",
            r"i am from",
            r"my hometown",
            r"my occupation",
            r"my profession",
            r"i am a",
            r"i work as",
        ],
    ),
    (
        "Preferences",
        &[
            r"i like",
            r"i love",
            r"i enjoy",
            r"i prefer",
            r"my favorite",
            r"i hate",
            r"i dislike",
            r"i'm not a fan of",
            r"i don't like",
            r"i'm interested in",
            r"i'm passionate about",
            r"i'm into",
        ],
    ),
    (
        "Goals",
        &[
            r"i want to",
            r"i hope to",
            r"i plan to",
            r"my goal is",
            r"i aspire to",
            r"i dream of",
            r"my objective is",
            r"i'm trying to",
            r"i'm working toward",
            r"my target is",
            r"i aim to",
        ],
    ),
    (
        "Skills",
        &[
            r"i can",
            r"i know how to",
            r"i'm good at",
            r"i'm skilled in",
            r"i have experience with",
            r"i'm proficient in",
            r"i'm expert in",
            r"i've mastered",
            r"i'm learning",
            r"i'm studying",
        ],
    ),
    (
        "Work",
        &[
            r"my job",
            r"my work",
            r"my company",
            r"my employer",
            r"my role",
            r"my position",
            r"my team",
            r"my manager",
            r"my colleague",
            r"my workplace",
            r"my office",
        ],
    ),
    (
        "Projects",
        &[
            r"my project",
            r"i'm working on",
            r"i'm building",
            r"i'm developing",
            r"my current project",
            r"the project i'm doing",
            r"i'm creating",
            r"i'm designing",
            r"i'm implementing",
        ],
    ),
    (
        "Relationships",
        &[
            r"my friend",
            r"my family",
            r"my colleague",
            r"my partner",
            r"my spouse",
            r"my parent",
            r"my child",
            r"my sibling",
            r"i know",
            r"i met",
            r"i was introduced to",
        ],
    ),
    (
        "Technical",
        &[
            r"programming",
            r"coding",
            r"software",
            r"algorithm",
            r"database",
            r"api",
            r"framework",
            r"library",
            r"debug",
            r"deploy",
            r"python",
            r"javascript",
            r"java",
            r"react",
            r"node",
            r"docker",
        ],
    ),
];

/// Context type pattern table. Group names parse back into [`ContextType`].
const TYPE_PATTERNS: &[(&str, &[&str])] = &[
    (
        "PersonalInfo",
        &[
            r"name",
            r"age",
            r"location",
            r"occupation",
            r"profession",
            r"hometown",
            r"birthday",
            r"address",
        ],
    ),
    (
        "Preference",
        &[r"like", r"love", r"prefer", r"favorite", r"hate", r"dislike"],
    ),
    (
        "Goal",
        &[r"goal", r"plan", r"objective", r"target", r"dream", r"aspire"],
    ),
    (
        "Skill",
        &[r"skill", r"ability", r"expertise", r"proficient", r"experienced"],
    ),
    (
        "Relationship",
        &[r"friend", r"family", r"colleague", r"partner", r"relationship"],
    ),
    (
        "Project",
        &[r"project", r"work", r"build", r"develop", r"create", r"design"],
    ),
];

/// Domain pattern table. Matched group names become tags directly.
const DOMAIN_PATTERNS: &[(&str, &[&str])] = &[
    (
        "technical",
        &[
            r"programming",
            r"coding",
            r"software",
            r"technology",
            r"computer",
            r"algorithm",
            r"database",
            r"api",
            r"framework",
            r"library",
            r"python",
            r"javascript",
            r"java",
            r"react",
            r"node",
            r"docker",
            r"git",
            r"linux",
            r"cloud",
            r"aws",
            r"azure",
        ],
    ),
    (
        "personal",
        &[
            r"family",
            r"friend",
            r"hobby",
            r"interest",
            r"personal",
            r"relationship",
            r"emotion",
            r"feeling",
            r"private",
            r"name",
            r"live",
        ],
    ),
    (
        "professional",
        &[
            r"work", r"job", r"career", r"business", r"meeting", r"project", r"team", r"manager",
            r"company", r"employer",
        ],
    ),
];

/// Result of categorizing a piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizationResult {
    pub context_category: ContextCategory,
    pub context_type: ContextType,
    /// Mean of the category and type sub-confidences, within [0, 1].
    pub confidence: f64,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
    /// At most five suggested tags.
    pub suggested_tags: Vec<String>,
}

/// Automatically categorizes context content.
pub struct ContextCategorizer {
    category_patterns: PatternSet,
    type_patterns: PatternSet,
    domain_patterns: PatternSet,
    token_pattern: Regex,
}

impl ContextCategorizer {
    /// Compile all categorization pattern tables.
    pub fn new() -> Result<Self, RecallError> {
        let token_pattern =
            Regex::new(r"\b[a-z]{4,}\b").map_err(|e| RecallError::Pattern {
                group: "tokens".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            category_patterns: PatternSet::compile(CATEGORY_PATTERNS)?,
            type_patterns: PatternSet::compile(TYPE_PATTERNS)?,
            domain_patterns: PatternSet::compile(DOMAIN_PATTERNS)?,
            token_pattern,
        })
    }

    /// Categorize content into (category, type, confidence, tags).
    pub fn categorize(&self, content: &str) -> CategorizationResult {
        let lowered = content.to_lowercase();

        let (category, category_confidence, category_reason) = self.analyze_category(&lowered);
        let (context_type, type_confidence, type_reason) = self.analyze_type(&lowered);
        let suggested_tags = self.suggest_tags(&lowered);

        CategorizationResult {
            context_category: category,
            context_type,
            confidence: (category_confidence + type_confidence) / 2.0,
            reasoning: format!("Category: {category_reason}. Type: {type_reason}."),
            suggested_tags,
        }
    }

    /// Re-categorize a stored entry in place.
    ///
    /// Only applies when the combined confidence exceeds 0.5; suggested tags
    /// are merged rather than replaced. Returns the result either way so
    /// callers can surface the reasoning.
    pub fn apply_to_entry(&self, entry: &mut ContextEntry) -> CategorizationResult {
        let result = self.categorize(&entry.content);
        if result.confidence > 0.5 {
            entry.context_category = result.context_category;
            entry.context_type = result.context_type;
            entry.merge_tags(result.suggested_tags.iter().cloned());
        }
        result
    }

    fn analyze_category(&self, content: &str) -> (ContextCategory, f64, String) {
        match self.category_patterns.best_match(content) {
            Some((name, hits)) => {
                let declared = self.category_patterns.group_len(name);
                let confidence =
                    (hits as f64 / declared as f64 + CATEGORY_BASE_OFFSET).min(1.0);
                // Group names are authored to parse; fall back defensively anyway.
                let category =
                    ContextCategory::from_str(name).unwrap_or(ContextCategory::Other);
                (
                    category,
                    confidence,
                    format!("matched {hits} patterns for {name}"),
                )
            }
            None => (
                ContextCategory::Other,
                FALLBACK_CONFIDENCE,
                "no category patterns matched".to_string(),
            ),
        }
    }

    fn analyze_type(&self, content: &str) -> (ContextType, f64, String) {
        match self.type_patterns.best_match(content) {
            Some((name, hits)) => {
                let declared = self.type_patterns.group_len(name);
                let confidence = (hits as f64 / declared as f64 + TYPE_BASE_OFFSET).min(1.0);
                let context_type = ContextType::from_str(name).unwrap_or(ContextType::Note);
                (
                    context_type,
                    confidence,
                    format!("matched {hits} patterns for {name}"),
                )
            }
            None => (
                ContextType::Note,
                FALLBACK_CONFIDENCE,
                "no type patterns matched".to_string(),
            ),
        }
    }

    /// Suggested tags: matched domain names, then the top three non-stopword
    /// tokens (length >= 4) by frequency, then `auto_extracted` when the
    /// content reads as a first-person declaration. Capped at five.
    fn suggest_tags(&self, content: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .domain_patterns
            .matched_groups(content)
            .into_iter()
            .map(String::from)
            .collect();

        let mut token_counts: HashMap<&str, usize> = HashMap::new();
        let mut token_order: Vec<&str> = Vec::new();
        for token in self.token_pattern.find_iter(content) {
            let token = token.as_str();
            if STOPWORDS.contains(&token) {
                continue;
            }
            let count = token_counts.entry(token).or_insert(0);
            if *count == 0 {
                token_order.push(token);
            }
            *count += 1;
        }
        // Sort by descending frequency, first-occurrence order on ties, so
        // the same content always produces the same tags.
        token_order.sort_by(|a, b| token_counts[b].cmp(&token_counts[a]));
        for token in token_order.into_iter().take(3) {
            if !tags.iter().any(|t| t == token) {
                tags.push(token.to_string());
            }
        }

        if FIRST_PERSON_MARKERS.iter().any(|m| content.contains(m)) {
            tags.push("auto_extracted".to_string());
        }

        tags.truncate(MAX_TAGS);
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorizer() -> ContextCategorizer {
        ContextCategorizer::new().unwrap()
    }

    #[test]
    fn personal_intro_categorizes_as_personal_info() {
        let result = categorizer().categorize("My name is Sam and I live in Austin.");
        assert_eq!(result.context_category, ContextCategory::PersonalInfo);
        // Type resolves to PersonalInfo (the "name" indicator) or Note.
        assert!(matches!(
            result.context_type,
            ContextType::PersonalInfo | ContextType::Note
        ));
        assert!(result.suggested_tags.iter().any(|t| t == "personal"));
        assert!(result
            .suggested_tags
            .iter()
            .any(|t| t == "name" || t == "austin" || t == "live"));
    }

    #[test]
    fn preference_statement_categorizes_as_preferences() {
        let result = categorizer().categorize("I love hiking and I enjoy photography");
        assert_eq!(result.context_category, ContextCategory::Preferences);
        assert_eq!(result.context_type, ContextType::Preference);
    }

    #[test]
    fn technical_content_categorizes_as_technical() {
        let result =
            categorizer().categorize("deploying the database api behind a python framework");
        assert_eq!(result.context_category, ContextCategory::Technical);
        assert!(result.suggested_tags.iter().any(|t| t == "technical"));
    }

    #[test]
    fn unmatched_content_falls_back_to_other_and_note() {
        let result = categorizer().categorize("zzz qqq");
        assert_eq!(result.context_category, ContextCategory::Other);
        assert_eq!(result.context_type, ContextType::Note);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn categorization_is_deterministic() {
        let c = categorizer();
        let content = "My name is Sam and I work at Acme building python services.";
        let first = c.categorize(content);
        let second = c.categorize(content);
        assert_eq!(first, second);
    }

    #[test]
    fn tags_are_capped_at_five() {
        let result = categorizer().categorize(
            "i am a programmer; programming python software projects with friends, family, \
             meetings and business plans at work",
        );
        assert!(result.suggested_tags.len() <= 5);
    }

    #[test]
    fn first_person_declarations_get_auto_extracted_tag() {
        let result = categorizer().categorize("i like coffee");
        assert!(result.suggested_tags.iter().any(|t| t == "auto_extracted"));
    }

    #[test]
    fn confidence_stays_within_unit_interval() {
        let result = categorizer().categorize(
            "i like i love i enjoy i prefer my favorite i hate i dislike things",
        );
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn apply_to_entry_updates_high_confidence_matches() {
        let c = categorizer();
        let mut entry = recall_core::ContextEntry::new_manual(
            "I love hiking and I prefer my favorite trails",
        );
        let result = c.apply_to_entry(&mut entry);
        assert!(result.confidence > 0.5);
        assert_eq!(entry.context_category, ContextCategory::Preferences);
        assert_eq!(entry.context_type, ContextType::Preference);
        assert!(!entry.tags.is_empty());
    }

    #[test]
    fn apply_to_entry_leaves_low_confidence_entries_alone() {
        let c = categorizer();
        let mut entry = recall_core::ContextEntry::new_manual("zzz qqq");
        entry.context_category = ContextCategory::Work;
        let result = c.apply_to_entry(&mut entry);
        assert!(result.confidence <= 0.5);
        assert_eq!(entry.context_category, ContextCategory::Work);
    }
}
