// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent builders for seeded context entries.

use chrono::{Duration, Utc};

use recall_core::{ContextCategory, ContextEntry, ContextType, ValidationStatus};

/// Builds [`ContextEntry`] values for test fixtures.
///
/// Defaults to a confirmed manual entry created now; every knob tests
/// care about (age, category, confidence, access count) is one call away.
pub struct EntryBuilder {
    entry: ContextEntry,
}

impl EntryBuilder {
    pub fn new(content: &str) -> Self {
        Self {
            entry: ContextEntry::new_manual(content),
        }
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.entry.user_id = Some(user_id.to_string());
        self
    }

    pub fn category(mut self, category: ContextCategory) -> Self {
        self.entry.context_category = category;
        self
    }

    pub fn context_type(mut self, context_type: ContextType) -> Self {
        self.entry.context_type = context_type;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.entry.set_confidence(confidence);
        self
    }

    pub fn status(mut self, status: ValidationStatus) -> Self {
        self.entry.validation_status = status;
        self
    }

    pub fn accessed(mut self, count: u64) -> Self {
        self.entry.access_count = count;
        self
    }

    pub fn days_old(mut self, days: i64) -> Self {
        self.entry.created_at = Utc::now() - Duration::days(days);
        self.entry.updated_at = self.entry.created_at;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry.merge_tags(tags);
        self
    }

    pub fn build(self) -> ContextEntry {
        self.entry
    }
}
