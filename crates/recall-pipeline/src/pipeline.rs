// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The injection pipeline: retrieval -> template -> formatting -> assembly.
//!
//! Strictly ordered per call, no branching back. Every stage appends a
//! trace step and a monitor event. Failure at any stage finalizes the
//! trace as failed and returns the original, unmodified prompt -- the
//! user-facing path is fail-open, never fail-closed.
//!
//! The downstream model call happens outside this crate: [`run`] returns
//! an [`ActiveInjection`] handle carrying the final prompt; after the
//! proxy forwards it, the optional model response can be logged on the
//! handle before [`ActiveInjection::finish`] seals the trace. Dropping the
//! handle without finishing finalizes the trace as failed (best-effort
//! cancellation safety).
//!
//! [`run`]: InjectionPipeline::run

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use recall_config::model::PipelineConfig;
use recall_retrieval::RetrievalScorer;

use crate::metrics::record_injection;
use crate::monitor::InjectionMonitor;
use crate::response::analyze_response;
use crate::template::{format_context_block, TemplateCatalog};
use crate::trace::{PipelineTrace, StepKind, TraceRecorder};

/// Final result of one injection run.
#[derive(Debug)]
pub struct InjectionOutcome {
    pub final_prompt: String,
    pub trace: PipelineTrace,
}

/// Orchestrates context injection for inbound prompts.
///
/// One instance serves all requests; each call owns its trace and scored
/// candidates, so concurrent invocations share nothing but the store and
/// the monitor.
pub struct InjectionPipeline {
    scorer: Arc<RetrievalScorer>,
    templates: TemplateCatalog,
    monitor: Arc<InjectionMonitor>,
    template_name: String,
}

impl InjectionPipeline {
    pub fn new(
        scorer: Arc<RetrievalScorer>,
        templates: TemplateCatalog,
        monitor: Arc<InjectionMonitor>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            scorer,
            templates,
            monitor,
            template_name: config.template.clone(),
        }
    }

    /// Run the injection pipeline for one inbound prompt.
    ///
    /// Never fails: a retrieval error (or any other stage failure)
    /// produces a handle whose final prompt is the original prompt and
    /// whose trace is already finalized as failed.
    pub async fn run(
        &self,
        model_id: &str,
        prompt: &str,
        user_id: Option<&str>,
    ) -> ActiveInjection {
        let mut recorder = TraceRecorder::new(model_id, prompt);
        let injection_id = recorder.injection_id().to_string();
        let started = Instant::now();

        recorder.record(
            StepKind::Start,
            serde_json::json!({ "model_id": model_id, "original_prompt": prompt }),
            serde_json::json!({ "injection_id": injection_id }),
        );
        self.monitor.record(
            &injection_id,
            model_id,
            StepKind::Start,
            serde_json::json!({ "original_prompt": prompt }),
        );

        let scored = match self.scorer.retrieve_text(prompt, user_id).await {
            Ok(scored) => scored,
            Err(e) => {
                // Degrade to the unmodified prompt; never block the
                // user-facing path on a store problem.
                warn!(model_id, error = %e, "context retrieval failed, passing prompt through");
                let message = e.to_string();
                recorder.record_failure(
                    StepKind::ContextRetrieved,
                    serde_json::json!({ "query": prompt }),
                    &message,
                );
                recorder.set_final_prompt(prompt);
                recorder.finalize(false, Some(&message));
                emit_complete(
                    &self.monitor,
                    &injection_id,
                    model_id,
                    false,
                    Some(&message),
                    started,
                    0,
                );
                return self.handle(recorder, prompt.to_string(), Vec::new(), started);
            }
        };

        let relevance_scores: HashMap<String, f64> = scored
            .iter()
            .map(|c| (c.entry.id.clone(), c.total_score))
            .collect();
        recorder.set_relevance_scores(relevance_scores.clone());
        recorder.record(
            StepKind::ContextRetrieved,
            serde_json::json!({ "query": prompt }),
            serde_json::json!({
                "contexts_found": scored.len(),
                "relevance_scores": relevance_scores,
            }),
        );
        self.monitor.record(
            &injection_id,
            model_id,
            StepKind::ContextRetrieved,
            serde_json::json!({ "contexts_found": scored.len() }),
        );

        if scored.is_empty() {
            // Nothing relevant: pass through unchanged, still a success.
            debug!(model_id, "no relevant context, passing prompt through");
            recorder.set_final_prompt(prompt);
            recorder.finalize(true, None);
            emit_complete(
                &self.monitor,
                &injection_id,
                model_id,
                true,
                None,
                started,
                0,
            );
            return self.handle(recorder, prompt.to_string(), Vec::new(), started);
        }

        let template = self.templates.get_or_default(&self.template_name);
        recorder.set_template(template.name);
        recorder.record(
            StepKind::TemplateSelected,
            serde_json::json!({ "available_templates": self.templates.names() }),
            serde_json::json!({
                "selected_template": template.name,
                "strength": template.strength,
            }),
        );
        self.monitor.record(
            &injection_id,
            model_id,
            StepKind::TemplateSelected,
            serde_json::json!({ "selected_template": template.name }),
        );

        let contents: Vec<String> = scored.iter().map(|c| c.entry.content.clone()).collect();
        let context_block = format_context_block(&contents);
        recorder.record(
            StepKind::ContextFormatted,
            serde_json::json!({
                "template": template.name,
                "context_count": contents.len(),
            }),
            serde_json::json!({ "formatted_context": context_block }),
        );
        self.monitor.record(
            &injection_id,
            model_id,
            StepKind::ContextFormatted,
            serde_json::json!({
                "formatted_context_length": context_block.len(),
                "context_entries_count": contents.len(),
            }),
        );

        let final_prompt = template.render(&context_block, prompt);
        recorder.set_final_prompt(&final_prompt);
        recorder.record(
            StepKind::PromptAssembled,
            serde_json::json!({ "original_prompt_length": prompt.len() }),
            serde_json::json!({
                "final_prompt_length": final_prompt.len(),
                "context_added": final_prompt.len().saturating_sub(prompt.len()),
            }),
        );
        self.monitor.record(
            &injection_id,
            model_id,
            StepKind::PromptAssembled,
            serde_json::json!({
                "original_prompt_length": prompt.len(),
                "final_prompt_length": final_prompt.len(),
            }),
        );

        info!(
            model_id,
            entries = contents.len(),
            template = template.name,
            "context injected"
        );
        self.handle(recorder, final_prompt, contents, started)
    }

    /// Run the pipeline and seal the trace immediately (no model response
    /// logging).
    pub async fn run_to_completion(
        &self,
        model_id: &str,
        prompt: &str,
        user_id: Option<&str>,
    ) -> InjectionOutcome {
        self.run(model_id, prompt, user_id).await.finish()
    }

    fn handle(
        &self,
        recorder: TraceRecorder,
        final_prompt: String,
        injected_contents: Vec<String>,
        started: Instant,
    ) -> ActiveInjection {
        ActiveInjection {
            context_entries: injected_contents.len(),
            model_id: recorder.trace().model_id.clone(),
            recorder: Some(recorder),
            monitor: Arc::clone(&self.monitor),
            final_prompt,
            injected_contents,
            started,
        }
    }
}

/// A pipeline run awaiting its optional model response and finalization.
///
/// Obtained from [`InjectionPipeline::run`]. Dropping the handle without
/// calling [`finish`](ActiveInjection::finish) finalizes the trace as
/// failed so no trace is ever left dangling.
#[derive(Debug)]
pub struct ActiveInjection {
    recorder: Option<TraceRecorder>,
    monitor: Arc<InjectionMonitor>,
    model_id: String,
    final_prompt: String,
    injected_contents: Vec<String>,
    context_entries: usize,
    started: Instant,
}

impl ActiveInjection {
    /// The prompt to forward downstream (the original prompt when the run
    /// failed or found nothing to inject).
    pub fn final_prompt(&self) -> &str {
        &self.final_prompt
    }

    /// The trace id of this injection.
    pub fn injection_id(&self) -> &str {
        self.recorder
            .as_ref()
            .map(|r| r.injection_id())
            .unwrap_or("")
    }

    /// Log the downstream model response and derive personalization
    /// signals. A missing response is simply never logged; callers treat
    /// "no response" as an error response and finish the run either way.
    ///
    /// No-op once the trace is complete (failed or already finished).
    pub fn record_ai_response(&mut self, response: &str) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if recorder.is_complete() {
            return;
        }

        let analysis = analyze_response(response, &self.injected_contents);
        recorder.record(
            StepKind::AiResponseLogged,
            serde_json::json!({ "response_length": response.len() }),
            serde_json::json!({
                "personalization_score": analysis.personalization_score,
                "mentions_user_info": analysis.mentions_user_info,
                "mentions_specific_details": analysis.mentions_specific_details,
            }),
        );
        self.monitor.record(
            recorder.injection_id(),
            &self.model_id,
            StepKind::AiResponseLogged,
            serde_json::json!({ "response_length": response.len() }),
        );
        recorder.set_ai_response(response, analysis);
    }

    /// Seal the trace and return the final prompt with it.
    ///
    /// Runs already finalized (failure, empty retrieval) pass through
    /// unchanged; otherwise the trace completes as successful here.
    pub fn finish(mut self) -> InjectionOutcome {
        let mut recorder = match self.recorder.take() {
            Some(recorder) => recorder,
            // Unreachable in practice: the recorder only leaves through
            // finish() or Drop, both of which consume the handle.
            None => TraceRecorder::new(&self.model_id, &self.final_prompt),
        };

        if !recorder.is_complete() {
            recorder.finalize(true, None);
            emit_complete(
                &self.monitor,
                recorder.injection_id(),
                &self.model_id,
                true,
                None,
                self.started,
                self.context_entries,
            );
        }

        InjectionOutcome {
            final_prompt: std::mem::take(&mut self.final_prompt),
            trace: recorder.into_trace(),
        }
    }
}

impl Drop for ActiveInjection {
    fn drop(&mut self) {
        if let Some(recorder) = self.recorder.as_mut() {
            if !recorder.is_complete() {
                // Caller abandoned the run: finalize as failed so the
                // trace and aggregates never dangle "in progress".
                recorder.finalize(false, Some("injection abandoned before completion"));
                emit_complete(
                    &self.monitor,
                    recorder.injection_id(),
                    &self.model_id,
                    false,
                    Some("injection abandoned before completion"),
                    self.started,
                    self.context_entries,
                );
            }
        }
    }
}

/// Record the Complete monitor event and the injection metrics.
fn emit_complete(
    monitor: &InjectionMonitor,
    injection_id: &str,
    model_id: &str,
    success: bool,
    error: Option<&str>,
    started: Instant,
    context_entries: usize,
) {
    monitor.record(
        injection_id,
        model_id,
        StepKind::Complete,
        serde_json::json!({ "success": success, "error_message": error }),
    );
    record_injection(
        model_id,
        success,
        started.elapsed().as_secs_f64(),
        context_entries,
    );
}
