// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mines candidate context entries out of conversation transcripts.
//!
//! User turns run through three pattern families: per-slot personal
//! information (name, location, profession, ...), generic facts, and
//! preferences/opinions. Assistant turns run through a smaller "reference"
//! family that catches the model restating something about the user.
//!
//! Extraction is deliberately over-inclusive; the deduplicator and
//! validator downstream are the precision filters. A turn that matches
//! nothing simply produces no candidates.

use std::collections::HashMap;

use regex::RegexBuilder;

use recall_core::{ContextType, Conversation, ConversationTurn, RecallError, TurnRole};

use crate::candidate::{CandidateSource, ExtractedCandidate, ExtractionConfidence};

/// Minimum length of a captured fragment worth keeping.
const MIN_FRAGMENT_LEN: usize = 3;

/// Truncation length for the `original_message` provenance metadata.
const ORIGINAL_MESSAGE_PREVIEW: usize = 100;

/// Keywords in the captured text indicating certainty.
const CERTAINTY_KEYWORDS: &[&str] = &["always", "never", "definitely", "certainly", "absolutely"];

/// Slot table: one entry per kind of personal information.
struct Slot {
    name: &'static str,
    context_type: ContextType,
    patterns: &'static [&'static str],
}

const SLOTS: &[Slot] = &[
    Slot {
        name: "name",
        context_type: ContextType::Note,
        patterns: &[
            r"\b(?:my name is|i'm|i am|call me)\s+([a-zA-Z\s]+)",
            r"\b(?:name|called)\s+([a-zA-Z\s]+)",
        ],
    },
    Slot {
        name: "location",
        context_type: ContextType::Note,
        patterns: &[
            r"\b(?:i live in|i'm from|based in|located in)\s+([a-zA-Z\s,]+)",
            r"\b(?:i'm in|living in)\s+([a-zA-Z\s,]+)",
        ],
    },
    Slot {
        name: "profession",
        context_type: ContextType::Note,
        patterns: &[
            r"\b(?:i work as|i'm a|my job is|i do)\s+([a-zA-Z\s]+)",
            r"\b(?:profession|career|occupation)\s+([a-zA-Z\s]+)",
        ],
    },
    Slot {
        name: "interests",
        context_type: ContextType::Preference,
        patterns: &[
            r"\b(?:i love|i enjoy|i like|i'm interested in|i'm passionate about)\s+([a-zA-Z\s,]+)",
            r"\b(?:hobbies|interests)\s+([a-zA-Z\s,]+)",
        ],
    },
    Slot {
        name: "preferences",
        context_type: ContextType::Preference,
        patterns: &[
            r"\b(?:i prefer|i'd rather|i like|i don't like|i hate)\s+([a-zA-Z\s,]+)",
            r"\b(?:favorite|best|worst)\s+([a-zA-Z\s,]+)",
        ],
    },
    Slot {
        name: "goals",
        context_type: ContextType::Note,
        patterns: &[
            r"\b(?:i want to|i'm trying to|my goal is|i hope to)\s+([a-zA-Z\s,]+)",
            r"\b(?:planning to|working on|building)\s+([a-zA-Z\s,]+)",
        ],
    },
    Slot {
        name: "current_projects",
        context_type: ContextType::Note,
        patterns: &[
            r"\b(?:i'm working on|currently building|developing)\s+([a-zA-Z\s,]+)",
            r"\b(?:project|building|creating)\s+([a-zA-Z\s,]+)",
        ],
    },
];

/// Generic fact patterns applied to user turns.
const FACT_PATTERNS: &[&str] = &[
    r"\b(?:i have|i own|i possess)\s+([a-zA-Z\s,]+)",
    r"\b(?:i went to|i studied at|i graduated from)\s+([a-zA-Z\s,]+)",
    r"\b(?:i have been|i've been)\s+([a-zA-Z\s,]+)",
    r"\b(?:i used to|i previously)\s+([a-zA-Z\s,]+)",
];

/// Preference/opinion patterns applied to user turns.
const PREFERENCE_PATTERNS: &[&str] = &[
    r"\b(?:i think|i believe|in my opinion)\s+([a-zA-Z\s,]+)",
    r"\b(?:i prefer|i'd rather|i like)\s+([a-zA-Z\s,]+)",
    r"\b(?:i don't like|i hate|i dislike)\s+([a-zA-Z\s,]+)",
    r"\b(?:i'm not a fan of|i'm not interested in)\s+([a-zA-Z\s,]+)",
];

/// Reference patterns applied to assistant turns (the model restating
/// something about the user).
const REFERENCE_PATTERNS: &[&str] = &[
    r"\b(?:you are|you're|you work as|you live in|you have)\s+([a-zA-Z\s,]+)",
    r"\b(?:as a|since you're|given that you)\s+([a-zA-Z\s,]+)",
    r"\b(?:based on|considering|given your)\s+([a-zA-Z\s,]+)",
];

/// A compiled pattern paired with its source text (the source text feeds
/// the specificity part of confidence scoring).
struct CompiledPattern {
    regex: regex::Regex,
    source: &'static str,
}

struct CompiledSlot {
    name: &'static str,
    context_type: ContextType,
    patterns: Vec<CompiledPattern>,
}

/// Extracts context candidates from conversations via pattern matching.
pub struct ContextExtractor {
    slots: Vec<CompiledSlot>,
    fact_patterns: Vec<CompiledPattern>,
    preference_patterns: Vec<CompiledPattern>,
    reference_patterns: Vec<CompiledPattern>,
}

fn compile_family(
    group: &'static str,
    patterns: &[&'static str],
) -> Result<Vec<CompiledPattern>, RecallError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map(|regex| CompiledPattern { regex, source: p })
                .map_err(|e| RecallError::Pattern {
                    group: group.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

impl ContextExtractor {
    /// Compile all extraction pattern tables.
    pub fn new() -> Result<Self, RecallError> {
        let slots = SLOTS
            .iter()
            .map(|slot| {
                Ok(CompiledSlot {
                    name: slot.name,
                    context_type: slot.context_type,
                    patterns: compile_family(slot.name, slot.patterns)?,
                })
            })
            .collect::<Result<Vec<_>, RecallError>>()?;

        Ok(Self {
            slots,
            fact_patterns: compile_family("facts", FACT_PATTERNS)?,
            preference_patterns: compile_family("preferences", PREFERENCE_PATTERNS)?,
            reference_patterns: compile_family("references", REFERENCE_PATTERNS)?,
        })
    }

    /// Extract candidates from every turn of a conversation.
    ///
    /// All matches are emitted; nothing here filters or merges.
    pub fn extract(&self, conversation: &Conversation) -> Vec<ExtractedCandidate> {
        let mut candidates = Vec::new();
        for turn in &conversation.turns {
            match turn.role {
                TurnRole::User => self.extract_from_user_turn(conversation, turn, &mut candidates),
                TurnRole::Assistant => {
                    self.extract_from_assistant_turn(conversation, turn, &mut candidates)
                }
            }
        }
        candidates
    }

    fn extract_from_user_turn(
        &self,
        conversation: &Conversation,
        turn: &ConversationTurn,
        out: &mut Vec<ExtractedCandidate>,
    ) {
        for slot in &self.slots {
            for pattern in &slot.patterns {
                for fragment in capture_fragments(pattern, &turn.content) {
                    let confidence = score_confidence(&fragment, pattern.source, &turn.content);
                    out.push(self.build_candidate(
                        conversation,
                        turn,
                        format!("User {}: {fragment}", slot.name),
                        slot.context_type,
                        confidence,
                        CandidateSource::UserPrompt,
                        vec![slot.name.to_string(), "auto_extracted".to_string()],
                        pattern.source,
                        Some(slot.name),
                    ));
                }
            }
        }

        for pattern in &self.fact_patterns {
            for fragment in capture_fragments(pattern, &turn.content) {
                let confidence = score_confidence(&fragment, pattern.source, &turn.content);
                out.push(self.build_candidate(
                    conversation,
                    turn,
                    format!("User fact: {fragment}"),
                    ContextType::Note,
                    confidence,
                    CandidateSource::UserPrompt,
                    vec!["fact".to_string(), "auto_extracted".to_string()],
                    pattern.source,
                    None,
                ));
            }
        }

        for pattern in &self.preference_patterns {
            for fragment in capture_fragments(pattern, &turn.content) {
                let confidence = score_confidence(&fragment, pattern.source, &turn.content);
                out.push(self.build_candidate(
                    conversation,
                    turn,
                    format!("User preference: {fragment}"),
                    ContextType::Preference,
                    confidence,
                    CandidateSource::UserPrompt,
                    vec!["preference".to_string(), "auto_extracted".to_string()],
                    pattern.source,
                    None,
                ));
            }
        }
    }

    fn extract_from_assistant_turn(
        &self,
        conversation: &Conversation,
        turn: &ConversationTurn,
        out: &mut Vec<ExtractedCandidate>,
    ) {
        for pattern in &self.reference_patterns {
            for fragment in capture_fragments(pattern, &turn.content) {
                let confidence = score_confidence(&fragment, pattern.source, &turn.content);
                out.push(self.build_candidate(
                    conversation,
                    turn,
                    format!("AI reference: {fragment}"),
                    ContextType::Note,
                    confidence,
                    CandidateSource::AiResponse,
                    vec!["ai_reference".to_string(), "auto_extracted".to_string()],
                    pattern.source,
                    None,
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_candidate(
        &self,
        conversation: &Conversation,
        turn: &ConversationTurn,
        content: String,
        context_type: ContextType,
        confidence: ExtractionConfidence,
        source: CandidateSource,
        tags: Vec<String>,
        pattern_source: &'static str,
        slot: Option<&'static str>,
    ) -> ExtractedCandidate {
        let mut metadata = HashMap::new();
        metadata.insert(
            "extraction_pattern".to_string(),
            serde_json::Value::String(pattern_source.to_string()),
        );
        if let Some(slot) = slot {
            metadata.insert(
                "info_type".to_string(),
                serde_json::Value::String(slot.to_string()),
            );
        }
        metadata.insert(
            "original_message".to_string(),
            serde_json::Value::String(preview(&turn.content)),
        );

        ExtractedCandidate {
            content,
            context_type,
            confidence,
            source,
            conversation_id: conversation.id.clone(),
            message_id: turn.message_id.clone(),
            tags,
            metadata,
        }
    }
}

/// All capture-group fragments for a pattern, trimmed and length-filtered.
fn capture_fragments(pattern: &CompiledPattern, content: &str) -> Vec<String> {
    pattern
        .regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|fragment| fragment.len() >= MIN_FRAGMENT_LEN)
        .collect()
}

/// Confidence from fragment length, certainty keywords, pattern
/// specificity, and first-person context in the 20 characters preceding
/// the match.
fn score_confidence(
    fragment: &str,
    pattern_source: &str,
    full_content: &str,
) -> ExtractionConfidence {
    let mut score: f64 = 0.0;

    // Longer fragments are usually more specific.
    if fragment.len() > 10 {
        score += 1.0;
    } else if fragment.len() > 5 {
        score += 0.5;
    }

    let fragment_lower = fragment.to_lowercase();
    if CERTAINTY_KEYWORDS.iter().any(|k| fragment_lower.contains(k)) {
        score += 1.0;
    }

    // Slot-specific identity patterns outrank generic preference ones.
    if pattern_source.contains("my name is") || pattern_source.contains("i am") {
        score += 1.0;
    } else if pattern_source.contains("i prefer") || pattern_source.contains("i like") {
        score += 0.5;
    }

    let content_lower = full_content.to_lowercase();
    if let Some(start) = content_lower.find(&fragment_lower) {
        let mut begin = start.saturating_sub(20);
        while !content_lower.is_char_boundary(begin) {
            begin += 1;
        }
        let before = &content_lower[begin..start];
        if before.contains('i') || before.contains("my") || before.contains("me") {
            score += 0.5;
        }
    }

    if score >= 2.0 {
        ExtractionConfidence::High
    } else if score >= 1.0 {
        ExtractionConfidence::Medium
    } else {
        ExtractionConfidence::Low
    }
}

/// Truncated copy of the originating message for provenance metadata.
fn preview(content: &str) -> String {
    if content.len() > ORIGINAL_MESSAGE_PREVIEW {
        let cut = content
            .char_indices()
            .take_while(|(i, _)| *i < ORIGINAL_MESSAGE_PREVIEW)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &content[..cut])
    } else {
        content.to_string()
    }
}
