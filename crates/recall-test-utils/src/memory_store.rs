// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory context store with real filter semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use recall_core::{ContextEntry, ContextFilter, ContextStore, RecallError, ValidationStatus};

/// In-memory [`ContextStore`] for tests.
///
/// Honors the full [`ContextFilter`] contract (user scoping, disputed
/// exclusion, confidence floor, category filter, limit) so tests exercise
/// the same query behavior a real backend would provide. Entries are
/// returned in insertion order; callers sort.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, ContextEntry>>,
    order: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with entries.
    pub fn seeded(entries: Vec<ContextEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock().expect("fresh lock");
            let mut order = store.order.lock().expect("fresh lock");
            for entry in entries {
                order.push(entry.id.clone());
                map.insert(entry.id.clone(), entry);
            }
        }
        store
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries, in insertion order.
    pub fn all(&self) -> Vec<ContextEntry> {
        let entries = self.entries.lock().expect("store lock");
        let order = self.order.lock().expect("store lock");
        order
            .iter()
            .filter_map(|id| entries.get(id).cloned())
            .collect()
    }

    fn locked(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, ContextEntry>>, RecallError> {
        self.entries
            .lock()
            .map_err(|_| RecallError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn find(
        &self,
        user_id: Option<&str>,
        filter: &ContextFilter,
    ) -> Result<Vec<ContextEntry>, RecallError> {
        let entries = self.locked()?;
        let order = self
            .order
            .lock()
            .map_err(|_| RecallError::Internal("memory store lock poisoned".to_string()))?;

        let mut found: Vec<ContextEntry> = order
            .iter()
            .filter_map(|id| entries.get(id))
            .filter(|e| user_id.is_none() || e.user_id.as_deref() == user_id)
            .filter(|e| {
                filter.include_disputed || e.validation_status != ValidationStatus::Disputed
            })
            .filter(|e| e.confidence_score >= filter.min_confidence)
            .filter(|e| {
                filter.categories.is_empty() || filter.categories.contains(&e.context_category)
            })
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn get(&self, id: &str) -> Result<Option<ContextEntry>, RecallError> {
        Ok(self.locked()?.get(id).cloned())
    }

    async fn save(&self, entry: &ContextEntry) -> Result<ContextEntry, RecallError> {
        let mut entries = self.locked()?;
        if !entries.contains_key(&entry.id) {
            self.order
                .lock()
                .map_err(|_| RecallError::Internal("memory store lock poisoned".to_string()))?
                .push(entry.id.clone());
        }
        entries.insert(entry.id.clone(), entry.clone());
        Ok(entry.clone())
    }

    async fn increment_access(&self, id: &str) -> Result<(), RecallError> {
        let mut entries = self.locked()?;
        if let Some(entry) = entries.get_mut(id) {
            entry.access_count += 1;
            entry.last_accessed_at = Some(Utc::now());
        }
        Ok(())
    }
}
