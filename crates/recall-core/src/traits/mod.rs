// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for external collaborators.
//!
//! The only collaborator the core depends on is the context store; the
//! outbound model call never happens inside this workspace (the assembled
//! prompt is handed back to the proxy).

pub mod store;

pub use store::{ContextFilter, ContextStore};
