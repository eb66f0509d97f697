// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the recall context engine.
//!
//! This crate provides the foundational error type, domain types, and the
//! store trait seam used throughout the recall workspace. Components in the
//! other crates are constructed once at startup and receive their
//! collaborators explicitly; nothing here is a global singleton.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RecallError;
pub use traits::{ContextFilter, ContextStore};
pub use types::{
    ContextCategory, ContextEntry, ContextSource, ContextType, Conversation, ConversationTurn,
    TurnRole, ValidationStatus,
};
