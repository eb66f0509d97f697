// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The composed extraction path: extract -> dedup -> validate.
//!
//! Runs off the request hot path (on conversation completion). Per-item
//! failures skip the item and continue the batch; only a store read failure
//! aborts the run.

use std::sync::Arc;

use tracing::{debug, warn};

use recall_core::{ContextFilter, ContextStore, Conversation, RecallError};

use crate::candidate::ExtractedCandidate;
use crate::dedup::Deduplicator;
use crate::extractor::ContextExtractor;
use crate::validator::{CandidateStatus, ValidationOutcome, Validator};

/// A deduplicated candidate with its validation outcome attached.
///
/// Staging drops candidates whose validation status is `Invalid`; the
/// caller applies the stricter persistence eligibility
/// ([`CandidateStatus::is_persistable`]) before saving.
#[derive(Debug, Clone)]
pub struct StagedCandidate {
    pub candidate: ExtractedCandidate,
    pub validation: ValidationOutcome,
}

/// Orchestrates extraction, deduplication, and validation against a store.
pub struct ExtractionPipeline {
    extractor: ContextExtractor,
    deduplicator: Deduplicator,
    validator: Validator,
    store: Arc<dyn ContextStore>,
}

impl ExtractionPipeline {
    /// Wire the extraction path together. Components are constructed by the
    /// caller so they can be shared and configured in one place.
    pub fn new(
        extractor: ContextExtractor,
        deduplicator: Deduplicator,
        validator: Validator,
        store: Arc<dyn ContextStore>,
    ) -> Self {
        Self {
            extractor,
            deduplicator,
            validator,
            store,
        }
    }

    /// Extract candidates from a conversation, dedup them against the
    /// user's stored entries and each other, validate, and return
    /// everything that survived.
    pub async fn extract_and_stage(
        &self,
        user_id: Option<&str>,
        conversation: &Conversation,
    ) -> Result<Vec<StagedCandidate>, RecallError> {
        let candidates = self.extractor.extract(conversation);
        if candidates.is_empty() {
            debug!(conversation_id = %conversation.id, "no candidates extracted");
            return Ok(Vec::new());
        }

        // Dedup compares against every stored entry regardless of status;
        // a fact already recorded as disputed is still a known fact.
        let filter = ContextFilter {
            include_disputed: true,
            ..ContextFilter::default()
        };
        let existing = self.store.find(user_id, &filter).await?;
        let existing_contents: Vec<String> =
            existing.into_iter().map(|entry| entry.content).collect();

        let deduped = self.deduplicator.dedup(candidates, &existing_contents);

        let mut staged = Vec::with_capacity(deduped.len());
        for candidate in deduped {
            let validation = self.validator.validate(&candidate);
            if validation.status == CandidateStatus::Invalid {
                warn!(
                    content = %candidate.content,
                    issues = ?validation.issues,
                    "discarding invalid candidate"
                );
                continue;
            }
            staged.push(StagedCandidate {
                candidate,
                validation,
            });
        }

        debug!(
            conversation_id = %conversation.id,
            staged = staged.len(),
            "extraction staging complete"
        );
        Ok(staged)
    }
}
