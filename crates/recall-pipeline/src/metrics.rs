// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_histogram};

/// Register all recall metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("recall_injections_total", "Total injection pipeline runs");
    describe_counter!(
        "recall_injection_failures_total",
        "Injection pipeline runs finalized as failed"
    );
    describe_histogram!(
        "recall_injection_duration_seconds",
        "Injection pipeline duration in seconds"
    );
    describe_histogram!(
        "recall_context_entries_per_injection",
        "Context entries injected per pipeline run"
    );
}

/// Record one completed injection.
pub fn record_injection(model: &str, success: bool, duration_secs: f64, context_entries: usize) {
    metrics::counter!("recall_injections_total", "model" => model.to_string()).increment(1);
    if !success {
        metrics::counter!("recall_injection_failures_total", "model" => model.to_string())
            .increment(1);
    }
    metrics::histogram!("recall_injection_duration_seconds").record(duration_secs);
    metrics::histogram!("recall_context_entries_per_injection").record(context_entries as f64);
}
