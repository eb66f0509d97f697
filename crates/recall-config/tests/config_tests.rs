// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the recall configuration system.

use recall_config::diagnostic::suggest_key;
use recall_config::{load_and_validate_str, load_config_from_str, ConfigError};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_recall_config() {
    let toml = r#"
[engine]
log_level = "debug"

[retrieval]
max_results = 5
min_confidence = 0.4
candidate_multiplier = 2
include_disputed = true

[dedup]
similarity_threshold = 0.85

[validator]
min_length = 5
max_length = 300

[conflict]
duplicate_threshold = 0.75

[pipeline]
template = "conversational"

[monitor]
max_events = 50
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.engine.log_level, "debug");
    assert_eq!(config.retrieval.max_results, 5);
    assert_eq!(config.retrieval.min_confidence, 0.4);
    assert_eq!(config.retrieval.candidate_multiplier, 2);
    assert!(config.retrieval.include_disputed);
    assert_eq!(config.dedup.similarity_threshold, 0.85);
    assert_eq!(config.validator.min_length, 5);
    assert_eq!(config.validator.max_length, 300);
    assert_eq!(config.conflict.duplicate_threshold, 0.75);
    assert_eq!(config.pipeline.template, "conversational");
    assert_eq!(config.monitor.max_events, 50);
}

/// Unknown field in [retrieval] section produces an error.
#[test]
fn unknown_field_in_retrieval_produces_error() {
    let toml = r#"
[retrieval]
max_reslts = 5
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_reslts"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.engine.log_level, "info");
    assert_eq!(config.retrieval.max_results, 10);
    assert_eq!(config.dedup.similarity_threshold, 0.8);
    assert_eq!(config.monitor.max_events, 100);
}

/// Semantic validation catches out-of-range values after deserialization.
#[test]
fn out_of_range_values_fail_load_and_validate() {
    let toml = r#"
[retrieval]
min_confidence = 1.5
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("min_confidence"))
    ));
}

/// The typo suggester points at the closest valid key.
#[test]
fn typo_suggestion_points_at_valid_key() {
    let valid = [
        "max_results",
        "min_confidence",
        "candidate_multiplier",
        "include_disputed",
    ];
    assert_eq!(
        suggest_key("min_confidnce", &valid),
        Some("min_confidence".to_string())
    );
}
