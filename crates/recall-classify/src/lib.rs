// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-table text classification for the recall context engine.
//!
//! Everything here is regex-table driven and deterministic:
//!
//! - **PatternSet**: named pattern groups with match counting
//! - **QueryIntentAnalyzer**: query text -> intent bucket + priority categories
//! - **ContextCategorizer**: content -> (category, type, tags, confidence)
//!
//! Tables are compiled once at component construction; matching is pure.

pub mod categorizer;
pub mod intent;
pub mod patterns;

pub use categorizer::{CategorizationResult, ContextCategorizer};
pub use intent::{IntentType, QueryIntentAnalyzer};
pub use patterns::PatternSet;
