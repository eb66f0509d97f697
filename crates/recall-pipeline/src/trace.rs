// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-injection trace recording.
//!
//! Each pipeline invocation owns one [`PipelineTrace`] built through a
//! [`TraceRecorder`]. Steps are strictly ordered; `Complete` is appended
//! exactly once, even when the run fails or is abandoned. The finished
//! trace is an immutable log record for the surrounding application to
//! persist.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::response::ResponseAnalysis;

/// Pipeline stages, in the only order they may occur.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    Start,
    ContextRetrieved,
    TemplateSelected,
    ContextFormatted,
    PromptAssembled,
    AiResponseLogged,
    Complete,
}

/// One recorded pipeline step with input/output snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub kind: StepKind,
    pub timestamp: DateTime<Utc>,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete log of one context injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTrace {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub model_id: String,
    pub original_prompt: String,
    pub final_prompt: String,
    pub steps: Vec<TraceStep>,
    /// Entry id -> total retrieval score for the retrieved set.
    pub relevance_scores: HashMap<String, f64>,
    pub template_used: String,
    pub successful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_analysis: Option<ResponseAnalysis>,
}

/// Builds a [`PipelineTrace`] step by step.
///
/// Explicitly threaded through the pipeline stages (never ambient state),
/// so concurrent injections are independent by construction.
#[derive(Debug)]
pub struct TraceRecorder {
    trace: PipelineTrace,
    completed: bool,
}

impl TraceRecorder {
    /// Start a trace for one injection.
    pub fn new(model_id: &str, original_prompt: &str) -> Self {
        Self {
            trace: PipelineTrace {
                id: uuid::Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                model_id: model_id.to_string(),
                original_prompt: original_prompt.to_string(),
                final_prompt: String::new(),
                steps: Vec::new(),
                relevance_scores: HashMap::new(),
                template_used: String::new(),
                successful: false,
                ai_response: None,
                response_analysis: None,
            },
            completed: false,
        }
    }

    /// The injection id of the trace under construction.
    pub fn injection_id(&self) -> &str {
        &self.trace.id
    }

    /// Append a successful step. Ignored after completion.
    pub fn record(&mut self, kind: StepKind, input: serde_json::Value, output: serde_json::Value) {
        if self.completed {
            return;
        }
        self.trace.steps.push(TraceStep {
            kind,
            timestamp: Utc::now(),
            input,
            output,
            success: true,
            error: None,
        });
    }

    /// Append a failed step. Ignored after completion.
    pub fn record_failure(&mut self, kind: StepKind, input: serde_json::Value, error: &str) {
        if self.completed {
            return;
        }
        self.trace.steps.push(TraceStep {
            kind,
            timestamp: Utc::now(),
            input,
            output: serde_json::Value::Null,
            success: false,
            error: Some(error.to_string()),
        });
    }

    pub fn set_relevance_scores(&mut self, scores: HashMap<String, f64>) {
        self.trace.relevance_scores = scores;
    }

    pub fn set_template(&mut self, name: &str) {
        self.trace.template_used = name.to_string();
    }

    pub fn set_final_prompt(&mut self, final_prompt: &str) {
        self.trace.final_prompt = final_prompt.to_string();
    }

    pub fn set_ai_response(&mut self, response: &str, analysis: ResponseAnalysis) {
        self.trace.ai_response = Some(response.to_string());
        self.trace.response_analysis = Some(analysis);
    }

    /// Append the `Complete` step and freeze the trace.
    ///
    /// Idempotent: only the first call has any effect, so every path
    /// (success, failure, abandonment) can finalize without coordination.
    pub fn finalize(&mut self, success: bool, error: Option<&str>) {
        if self.completed {
            return;
        }
        let total_steps = self.trace.steps.len();
        self.trace.steps.push(TraceStep {
            kind: StepKind::Complete,
            timestamp: Utc::now(),
            input: serde_json::json!({ "total_steps": total_steps }),
            output: serde_json::json!({
                "final_status": if success { "success" } else { "failed" },
                "error_message": error,
            }),
            success,
            error: error.map(String::from),
        });
        self.trace.successful = success;
        self.completed = true;
    }

    /// Whether `Complete` has been recorded.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Read access to the trace under construction.
    pub fn trace(&self) -> &PipelineTrace {
        &self.trace
    }

    /// Consume the recorder, yielding the finished trace.
    pub fn into_trace(self) -> PipelineTrace {
        self.trace
    }
}
