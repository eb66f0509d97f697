// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for recall integration tests.
//!
//! Provides in-memory store implementations and entry builders for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory [`recall_core::ContextStore`] with real
//!   filter semantics
//! - [`FailingStore`] - Store whose every call fails, for fail-open tests
//! - [`EntryBuilder`] - Fluent construction of seeded context entries

pub mod builders;
pub mod failing_store;
pub mod memory_store;

pub use builders::EntryBuilder;
pub use failing_store::FailingStore;
pub use memory_store::MemoryStore;
