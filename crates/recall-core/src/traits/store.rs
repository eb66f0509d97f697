// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context store trait for persistence backends.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::types::{ContextCategory, ContextEntry};

/// Filter applied by [`ContextStore::find`].
///
/// Field semantics mirror the retrieval candidate query: entries below
/// `min_confidence` are excluded, `Disputed` entries are excluded unless
/// `include_disputed` is set, and a non-empty `categories` list restricts
/// results to those categories.
#[derive(Debug, Clone, Default)]
pub struct ContextFilter {
    pub categories: Vec<ContextCategory>,
    pub min_confidence: f64,
    pub include_disputed: bool,
    /// Maximum number of entries to return; `None` means unbounded.
    pub limit: Option<usize>,
}

/// Keyed, queryable store of context entries.
///
/// Implementations live outside this workspace (the surrounding application
/// owns the schema); `recall-test-utils` provides an in-memory one for
/// tests. Writes are atomic per entry; reads return a consistent snapshot.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Return entries for `user_id` (or unscoped entries when `None`)
    /// matching the filter. Ordering is unspecified; callers sort.
    async fn find(
        &self,
        user_id: Option<&str>,
        filter: &ContextFilter,
    ) -> Result<Vec<ContextEntry>, RecallError>;

    /// Fetch a single entry by id.
    async fn get(&self, id: &str) -> Result<Option<ContextEntry>, RecallError>;

    /// Insert or update an entry, atomically. Returns the stored value.
    async fn save(&self, entry: &ContextEntry) -> Result<ContextEntry, RecallError>;

    /// Atomically bump `access_count` and stamp `last_accessed_at`.
    ///
    /// Best-effort telemetry: lost updates under contention are tolerated,
    /// corruption is not.
    async fn increment_access(&self, id: &str) -> Result<(), RecallError>;
}
