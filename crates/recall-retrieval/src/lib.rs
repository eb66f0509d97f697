// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intelligent retrieval for the recall context engine.
//!
//! The [`RetrievalScorer`] ranks stored entries against a query using five
//! weighted signals (relevance 0.4, recency 0.2, confidence 0.2, access
//! frequency 0.1, category relevance 0.1). Scoring is deterministic; the
//! only state it mutates is the access counters of the entries it returns.

pub mod query;
pub mod scorer;

pub use query::{RetrievalQuery, ScoredCandidate};
pub use scorer::RetrievalScorer;
