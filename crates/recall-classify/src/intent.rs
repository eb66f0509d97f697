// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query intent analysis.
//!
//! Classifies a free-text query into an intent bucket and the context
//! categories worth searching for that intent. Zero-cost pattern matching,
//! no LLM pre-call, no network, no latency.

use recall_core::{ContextCategory, RecallError};

use crate::patterns::PatternSet;

/// Intent buckets a query can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentType {
    PersonalInfo,
    Preferences,
    Technical,
    Goals,
    Work,
    Relationships,
    /// Fallback when no intent patterns match.
    General,
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntentType::PersonalInfo => "personal_info",
            IntentType::Preferences => "preferences",
            IntentType::Technical => "technical",
            IntentType::Goals => "goals",
            IntentType::Work => "work",
            IntentType::Relationships => "relationships",
            IntentType::General => "general",
        };
        write!(f, "{s}")
    }
}

/// Pattern table for intent detection. Group order matters: ties resolve to
/// the earliest group.
const INTENT_PATTERNS: &[(&str, &[&str])] = &[
    (
        "personal_info",
        &[
            r"who are you",
            r"what do you know about me",
            r"tell me about myself",
            r"my name",
            r"my age",
            r"where do i live",
            r"what do i do",
        ],
    ),
    (
        "preferences",
        &[
            r"what do i like",
            r"my favorite",
            r"prefer",
            r"preference",
            r"what do i enjoy",
            r"hobb(?:y|ies)",
            r"interest",
        ],
    ),
    (
        "technical",
        &[
            r"how to",
            r"code",
            r"programming",
            r"technical",
            r"debug",
            r"algorithm",
            r"architecture",
            r"system design",
        ],
    ),
    (
        "goals",
        &[
            r"goal",
            r"want to",
            r"planning to",
            r"objective",
            r"target",
            r"aspire",
            r"dream",
            r"ambition",
        ],
    ),
    (
        "work",
        &[
            r"work", r"job", r"career", r"employer", r"company", r"project", r"meeting",
            r"deadline",
        ],
    ),
    (
        "relationships",
        &[
            r"friend",
            r"family",
            r"colleague",
            r"relationship",
            r"know",
            r"met",
            r"introduced",
        ],
    ),
];

/// Analyzes query intent to determine what type of context is needed.
///
/// Pure: two calls with the same query always return the same result.
pub struct QueryIntentAnalyzer {
    patterns: PatternSet,
}

impl QueryIntentAnalyzer {
    /// Compile the intent pattern table.
    pub fn new() -> Result<Self, RecallError> {
        Ok(Self {
            patterns: PatternSet::compile(INTENT_PATTERNS)?,
        })
    }

    /// Classify a query into an intent and its priority categories.
    ///
    /// The group with the most pattern hits wins; ties break to declaration
    /// order. No hits (including empty input) falls back to
    /// [`IntentType::General`] with a broad category set.
    pub fn analyze(&self, query: &str) -> (IntentType, Vec<ContextCategory>) {
        let intent = match self.patterns.best_match(query) {
            Some(("personal_info", _)) => IntentType::PersonalInfo,
            Some(("preferences", _)) => IntentType::Preferences,
            Some(("technical", _)) => IntentType::Technical,
            Some(("goals", _)) => IntentType::Goals,
            Some(("work", _)) => IntentType::Work,
            Some(("relationships", _)) => IntentType::Relationships,
            _ => IntentType::General,
        };

        (intent, categories_for(intent))
    }
}

/// Fixed intent-to-category lookup.
fn categories_for(intent: IntentType) -> Vec<ContextCategory> {
    use ContextCategory::*;
    match intent {
        IntentType::PersonalInfo => vec![PersonalInfo, Work],
        IntentType::Preferences => vec![Preferences, Personal],
        IntentType::Technical => vec![Technical, Skills, Projects],
        IntentType::Goals => vec![Goals, Projects],
        IntentType::Work => vec![Work, Projects, Professional],
        IntentType::Relationships => vec![Relationships, Personal],
        IntentType::General => vec![PersonalInfo, Preferences, Work],
    }
}
