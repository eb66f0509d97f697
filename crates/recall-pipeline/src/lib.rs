// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injection pipeline for the recall context engine.
//!
//! Orchestrates retrieval -> template selection -> context formatting ->
//! prompt assembly for every inbound proxied request, while recording:
//!
//! - **PipelineTrace** (via [`TraceRecorder`]): a step-by-step, queryable
//!   log owned by each invocation
//! - **InjectionMonitor**: a shared bounded ring buffer of recent events
//!   plus running aggregates, with lock-free reads
//! - **metrics**: counters/histograms through the metrics-rs facade
//!
//! The user-facing path is fail-open: any stage failure yields the
//! original prompt and a trace finalized as failed.

pub mod metrics;
pub mod monitor;
pub mod pipeline;
pub mod response;
pub mod template;
pub mod trace;

pub use monitor::{DashboardView, InjectionMonitor, MonitorEvent, MonitorStats};
pub use pipeline::{ActiveInjection, InjectionOutcome, InjectionPipeline};
pub use response::{analyze_response, ResponseAnalysis};
pub use template::{format_context_block, PromptTemplate, TemplateCatalog};
pub use trace::{PipelineTrace, StepKind, TraceRecorder, TraceStep};
