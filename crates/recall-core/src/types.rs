// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the recall workspace.
//!
//! The central type is [`ContextEntry`], a durable fact about the user.
//! Everything else here is taxonomy (type/category/source/status enums) and
//! the conversation transcript types consumed by extraction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What kind of fact a context entry records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ContextType {
    PersonalInfo,
    Preference,
    Goal,
    Skill,
    Relationship,
    Project,
    Note,
    Text,
    Event,
    File,
}

/// The domain a context entry belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ContextCategory {
    PersonalInfo,
    Preferences,
    Work,
    Skills,
    Goals,
    Relationships,
    Projects,
    Technical,
    Personal,
    Professional,
    Other,
}

/// How a context entry was created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ContextSource {
    Manual,
    Extracted,
    Conversation,
    Imported,
    Api,
}

/// Lifecycle status of a context entry.
///
/// `Outdated` is the terminal soft-delete state; physical deletion is an
/// external retention concern.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ValidationStatus {
    Pending,
    Confirmed,
    Disputed,
    Outdated,
}

/// A durable fact about the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Owning user, if the deployment is multi-user.
    pub user_id: Option<String>,
    /// The fact itself.
    pub content: String,
    /// Fine-grained kind of fact.
    pub context_type: ContextType,
    /// Domain bucket used by retrieval.
    pub context_category: ContextCategory,
    /// Provenance of the entry.
    pub context_source: ContextSource,
    /// Reliability estimate, always within [0, 1].
    pub confidence_score: f64,
    /// Current lifecycle status.
    pub validation_status: ValidationStatus,
    /// Free-form labels; treated as a set (no duplicates).
    pub tags: Vec<String>,
    /// String-keyed metadata. Opaque except for provenance keys written by
    /// the conflict resolver and deduplicator.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Optional weak reference to a related entry (no ownership).
    pub parent_context_id: Option<String>,
    /// How many times retrieval has returned this entry.
    pub access_count: u64,
    /// When retrieval last returned this entry.
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContextEntry {
    /// Create a manually entered fact. Manual input is fully trusted
    /// (confidence 1.0) and starts `Confirmed`.
    pub fn new_manual(content: impl Into<String>) -> Self {
        let mut entry = Self::new(content, ContextSource::Manual, 1.0);
        entry.validation_status = ValidationStatus::Confirmed;
        entry
    }

    /// Create an extracted fact with the given confidence. Extracted entries
    /// start `Pending` until validated or confirmed.
    pub fn new_extracted(content: impl Into<String>, confidence: f64) -> Self {
        Self::new(content, ContextSource::Extracted, confidence)
    }

    fn new(content: impl Into<String>, source: ContextSource, confidence: f64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            content: content.into(),
            context_type: ContextType::Note,
            context_category: ContextCategory::Other,
            context_source: source,
            confidence_score: confidence.clamp(0.0, 1.0),
            validation_status: ValidationStatus::Pending,
            tags: Vec::new(),
            metadata: HashMap::new(),
            parent_context_id: None,
            access_count: 0,
            last_accessed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the confidence score, clamping into [0, 1].
    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence_score = confidence.clamp(0.0, 1.0);
    }

    /// Add tags that are not already present, preserving insertion order.
    pub fn merge_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.iter().any(|t| *t == tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Write a metadata value, bumping `updated_at`.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
        self.updated_at = Utc::now();
    }

    /// Age of this entry in whole days relative to `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

/// Who produced a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of a logged conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Unique message identifier within the conversation.
    pub message_id: String,
    pub role: TurnRole,
    pub content: String,
}

/// An ordered conversation transcript, the input to extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Create a conversation with a fresh UUID id.
    pub fn new(turns: Vec<ConversationTurn>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            turns,
        }
    }
}
