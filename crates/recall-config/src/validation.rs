// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as thresholds staying within [0, 1] and length bounds
//! being ordered.

use crate::diagnostic::ConfigError;
use crate::model::RecallConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RecallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut check_unit = |name: &str, value: f64| {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be within [0.0, 1.0], got {value}"),
            });
        }
    };

    check_unit("retrieval.min_confidence", config.retrieval.min_confidence);
    check_unit("dedup.similarity_threshold", config.dedup.similarity_threshold);
    check_unit(
        "conflict.duplicate_threshold",
        config.conflict.duplicate_threshold,
    );

    if config.retrieval.max_results == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.max_results must be at least 1".to_string(),
        });
    }

    if config.retrieval.candidate_multiplier == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.candidate_multiplier must be at least 1".to_string(),
        });
    }

    if config.validator.min_length > config.validator.max_length {
        errors.push(ConfigError::Validation {
            message: format!(
                "validator.min_length ({}) must not exceed validator.max_length ({})",
                config.validator.min_length, config.validator.max_length
            ),
        });
    }

    if config.pipeline.template.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "pipeline.template must not be empty".to_string(),
        });
    }

    if config.monitor.max_events == 0 {
        errors.push(ConfigError::Validation {
            message: "monitor.max_events must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RecallConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = RecallConfig::default();
        config.dedup.similarity_threshold = 1.2;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("similarity_threshold"))
        ));
    }

    #[test]
    fn zero_max_results_fails_validation() {
        let mut config = RecallConfig::default();
        config.retrieval.max_results = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("max_results"))
        ));
    }

    #[test]
    fn inverted_length_bounds_fail_validation() {
        let mut config = RecallConfig::default();
        config.validator.min_length = 600;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("min_length"))
        ));
    }

    #[test]
    fn multiple_errors_are_collected() {
        let mut config = RecallConfig::default();
        config.retrieval.min_confidence = -0.5;
        config.monitor.max_events = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
