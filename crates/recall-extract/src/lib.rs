// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation mining for the recall context engine.
//!
//! Extraction is deliberately over-inclusive and the downstream stages are
//! the precision filters:
//!
//! - **ContextExtractor**: regex slot/fact/preference tables over turns
//! - **Deduplicator**: drops candidates similar to stored entries, merges
//!   near-duplicates within a batch
//! - **Validator**: four-check quality gate before persistence
//! - **ExtractionPipeline**: the composed extract -> dedup -> validate path

pub mod candidate;
pub mod dedup;
pub mod extractor;
pub mod staging;
pub mod validator;

pub use candidate::{CandidateSource, ExtractedCandidate, ExtractionConfidence};
pub use dedup::{similarity_ratio, Deduplicator};
pub use extractor::ContextExtractor;
pub use staging::{ExtractionPipeline, StagedCandidate};
pub use validator::{CandidateStatus, ValidationOutcome, Validator};
