// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A store whose every call fails, for fail-open tests.

use async_trait::async_trait;

use recall_core::{ContextEntry, ContextFilter, ContextStore, RecallError};

/// [`ContextStore`] that fails every operation with a store error.
///
/// Used to verify the degraded paths: retrieval failures must produce an
/// empty candidate list and the injection pipeline must pass the original
/// prompt through.
#[derive(Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn new() -> Self {
        Self
    }

    fn unreachable_err() -> RecallError {
        RecallError::store(std::io::Error::other("store unreachable"))
    }
}

#[async_trait]
impl ContextStore for FailingStore {
    async fn find(
        &self,
        _user_id: Option<&str>,
        _filter: &ContextFilter,
    ) -> Result<Vec<ContextEntry>, RecallError> {
        Err(Self::unreachable_err())
    }

    async fn get(&self, _id: &str) -> Result<Option<ContextEntry>, RecallError> {
        Err(Self::unreachable_err())
    }

    async fn save(&self, _entry: &ContextEntry) -> Result<ContextEntry, RecallError> {
        Err(Self::unreachable_err())
    }

    async fn increment_access(&self, _id: &str) -> Result<(), RecallError> {
        Err(Self::unreachable_err())
    }
}
