// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the recall context engine.

use thiserror::Error;

/// The primary error type used across all recall components.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid TOML, missing required fields, bad thresholds).
    #[error("configuration error: {0}")]
    Config(String),

    /// Context store errors (backend unreachable, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A pattern table failed to compile at construction time.
    #[error("pattern error in group `{group}`: {message}")]
    Pattern { group: String, message: String },

    /// An injection pipeline stage failed.
    #[error("pipeline stage `{stage}` failed: {message}")]
    Pipeline { stage: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Wrap an arbitrary error as a store error.
    pub fn store<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RecallError::Store {
            source: Box::new(source),
        }
    }
}
