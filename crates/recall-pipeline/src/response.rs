// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lightweight analysis of the model response for personalization signals.
//!
//! Heuristic only: the goal is a cheap, inspectable hint of whether the
//! injected context actually influenced the response, not a rigorous
//! attribution.

use serde::{Deserialize, Serialize};

/// Second-person indicators counted toward the personalization score.
const PERSONAL_INDICATORS: &[&str] = &[
    "you", "your", "you're", "you've", "i know", "as you", "given that you",
];

/// Indicator hits at which the personalization score saturates at 1.0.
const PERSONALIZATION_CAP: f64 = 5.0;

/// Phrases suggesting the response references specific injected details.
const SPECIFIC_INDICATORS: &[&str] = &[
    "specifically",
    "in particular",
    "as you mentioned",
    "based on",
    "considering",
];

/// How many leading words of each injected entry are probed for echoes.
const ECHO_WORDS: usize = 3;

/// Personalization signals derived from a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    pub response_length: usize,
    /// Any injected entry's first few words reappear in the response.
    pub mentions_user_info: bool,
    /// The response uses phrases that reference specific details.
    pub mentions_specific_details: bool,
    /// Second-person indicator density, capped at 1.0.
    pub personalization_score: f64,
    /// Human-readable evidence of context usage.
    pub evidence: Vec<String>,
}

/// Analyze a model response against the injected entry contents.
pub fn analyze_response(response: &str, injected_contents: &[String]) -> ResponseAnalysis {
    let response_lower = response.to_lowercase();

    let mut mentions_user_info = false;
    let mut evidence = Vec::new();
    for content in injected_contents {
        let content_lower = content.to_lowercase();
        let echoed = content_lower
            .split_whitespace()
            .take(ECHO_WORDS)
            .any(|word| response_lower.contains(word));
        if echoed {
            mentions_user_info = true;
            let preview: String = content.chars().take(50).collect();
            evidence.push(format!("mentions content from context: {preview}"));
        }
    }

    let personal_hits = PERSONAL_INDICATORS
        .iter()
        .filter(|indicator| response_lower.contains(**indicator))
        .count();
    let personalization_score = (personal_hits as f64 / PERSONALIZATION_CAP).min(1.0);

    let mentions_specific_details = SPECIFIC_INDICATORS
        .iter()
        .any(|indicator| response_lower.contains(indicator));

    ResponseAnalysis {
        response_length: response.len(),
        mentions_user_info,
        mentions_specific_details,
        personalization_score,
        evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoed_context_is_detected() {
        let injected = vec!["I love hiking in the mountains".to_string()];
        let analysis = analyze_response(
            "Since you love outdoor activities, try the new trail!",
            &injected,
        );
        assert!(analysis.mentions_user_info);
        assert_eq!(analysis.evidence.len(), 1);
    }

    #[test]
    fn unrelated_response_has_no_echo() {
        let injected = vec!["Quarterly budgets finalized".to_string()];
        let analysis = analyze_response("Here is a pasta recipe.", &injected);
        assert!(!analysis.mentions_user_info);
        assert!(analysis.evidence.is_empty());
    }

    #[test]
    fn personalization_score_is_capped_at_one() {
        let analysis = analyze_response(
            "you and your plans: you're ready, you've prepared, as you said, i know, given that you asked",
            &[],
        );
        assert_eq!(analysis.personalization_score, 1.0);
    }

    #[test]
    fn partial_personalization_is_fractional() {
        // Exactly two indicators: "your" and "you" (substring of "your").
        let analysis = analyze_response("Here is your schedule.", &[]);
        assert!(analysis.personalization_score > 0.0);
        assert!(analysis.personalization_score < 1.0);
    }

    #[test]
    fn specific_detail_phrases_are_flagged() {
        let analysis = analyze_response("Based on what I know, try bouldering.", &[]);
        assert!(analysis.mentions_specific_details);

        let analysis = analyze_response("Try bouldering.", &[]);
        assert!(!analysis.mentions_specific_details);
    }

    #[test]
    fn response_length_is_recorded() {
        let analysis = analyze_response("short", &[]);
        assert_eq!(analysis.response_length, 5);
    }
}
