// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-persistence candidate types produced by extraction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use recall_core::ContextType;

/// Confidence level assigned to an extracted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionConfidence {
    Low,
    Medium,
    High,
}

impl ExtractionConfidence {
    /// Numeric rank for comparisons (higher is more confident).
    pub fn rank(&self) -> u8 {
        match self {
            ExtractionConfidence::Low => 1,
            ExtractionConfidence::Medium => 2,
            ExtractionConfidence::High => 3,
        }
    }

    /// The stored confidence score a candidate of this level starts with.
    pub fn as_score(&self) -> f64 {
        match self {
            ExtractionConfidence::Low => 0.3,
            ExtractionConfidence::Medium => 0.6,
            ExtractionConfidence::High => 0.8,
        }
    }
}

/// Which side of the conversation a candidate was mined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateSource {
    UserPrompt,
    AiResponse,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSource::UserPrompt => write!(f, "user_prompt"),
            CandidateSource::AiResponse => write!(f, "ai_response"),
        }
    }
}

/// A piece of context mined from a conversation, not yet persisted.
///
/// Produced by extraction, consumed by dedup -> validation ->
/// categorization -> persistence; discarded if it fails validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    pub content: String,
    pub context_type: ContextType,
    pub confidence: ExtractionConfidence,
    pub source: CandidateSource,
    pub conversation_id: String,
    pub message_id: String,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExtractedCandidate {
    /// Add a tag if not already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.iter().any(|t| *t == tag) {
            self.tags.push(tag);
        }
    }
}
