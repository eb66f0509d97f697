// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recall.toml` > `~/.config/recall/recall.toml`
//! > `/etc/recall/recall.toml` with environment variable overrides via the
//! `RECALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecallConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recall/recall.toml` (system-wide)
/// 3. `~/.config/recall/recall.toml` (user XDG config)
/// 4. `./recall.toml` (local directory)
/// 5. `RECALL_*` environment variables
pub fn load_config() -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file("/etc/recall/recall.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recall/recall.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recall.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RECALL_RETRIEVAL_MAX_RESULTS` must map
/// to `retrieval.max_results`, not `retrieval.max.results`.
fn env_provider() -> Env {
    Env::prefixed("RECALL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RECALL_RETRIEVAL_MAX_RESULTS -> "retrieval_max_results"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("dedup_", "dedup.", 1)
            .replacen("validator_", "validator.", 1)
            .replacen("conflict_", "conflict.", 1)
            .replacen("pipeline_", "pipeline.", 1)
            .replacen("monitor_", "monitor.", 1);
        mapped.into()
    })
}
