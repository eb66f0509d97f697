// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the recall context engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level recall configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to the tuning
/// the engine ships with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Engine-wide settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Retrieval scoring settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Candidate deduplication settings.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Extracted-candidate validation settings.
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Conflict detection settings.
    #[serde(default)]
    pub conflict: ConflictConfig,

    /// Injection pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Injection monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Retrieval scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum number of scored entries returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum stored confidence an entry needs to enter scoring (0.0-1.0).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Candidates fetched before scoring, as a multiple of `max_results`.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    /// Include entries whose status is `Disputed`.
    #[serde(default)]
    pub include_disputed: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_confidence: default_min_confidence(),
            candidate_multiplier: default_candidate_multiplier(),
            include_disputed: false,
        }
    }
}

fn default_max_results() -> usize {
    10
}

fn default_min_confidence() -> f64 {
    0.3
}

fn default_candidate_multiplier() -> usize {
    3
}

/// Deduplication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// Similarity ratio at or above which two candidates are duplicates
    /// (0.0-1.0, inclusive threshold).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.8
}

/// Validation configuration for extracted candidates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Minimum candidate content length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Maximum candidate content length in characters.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
        }
    }
}

fn default_min_length() -> usize {
    3
}

fn default_max_length() -> usize {
    500
}

/// Conflict detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictConfig {
    /// Similarity ratio above which two entries form a duplicate conflict
    /// (0.0-1.0, exclusive threshold).
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

fn default_duplicate_threshold() -> f64 {
    0.8
}

/// Injection pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Name of the prompt template used to format injected context.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

fn default_template() -> String {
    "default".to_string()
}

/// Injection monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Size of the bounded ring buffer of recent raw events.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
        }
    }
}

fn default_max_events() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_tuning() {
        let config = RecallConfig::default();
        assert_eq!(config.retrieval.max_results, 10);
        assert_eq!(config.retrieval.min_confidence, 0.3);
        assert_eq!(config.retrieval.candidate_multiplier, 3);
        assert!(!config.retrieval.include_disputed);
        assert_eq!(config.dedup.similarity_threshold, 0.8);
        assert_eq!(config.validator.min_length, 3);
        assert_eq!(config.validator.max_length, 500);
        assert_eq!(config.conflict.duplicate_threshold, 0.8);
        assert_eq!(config.pipeline.template, "default");
        assert_eq!(config.monitor.max_events, 100);
        assert_eq!(config.engine.log_level, "info");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[retrieval]
max_results = 5
"#;
        let config: RecallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.retrieval.max_results, 5);
        assert_eq!(config.retrieval.min_confidence, 0.3);
        assert_eq!(config.dedup.similarity_threshold, 0.8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[retrieval]
max_reslts = 5
"#;
        let result = toml::from_str::<RecallConfig>(toml_str);
        assert!(result.is_err());
    }
}
