// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-lived injection monitor.
//!
//! Keeps a bounded ring buffer of the most recent raw pipeline events plus
//! running aggregates. Writers serialize on a mutex; readers load an
//! atomically swapped snapshot, so reads never block writers. The buffer
//! records arrival order: concurrent injections interleave.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::trace::StepKind;

/// One raw monitor event, tagged with its injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEvent {
    pub timestamp: DateTime<Utc>,
    pub injection_id: String,
    pub model_id: String,
    pub stage: StepKind,
    pub data: serde_json::Value,
}

/// Running aggregates over all recorded injections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorStats {
    pub total_injections: u64,
    pub successful_injections: u64,
    pub failed_injections: u64,
    /// Rolling mean injection duration in milliseconds (incremental mean).
    pub average_injection_ms: f64,
    /// Rolling mean number of context entries per injection.
    pub average_context_entries: f64,
    pub templates_used: HashMap<String, u64>,
    pub models_used: HashMap<String, u64>,
}

/// Point-in-time dashboard snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// The most recent events, oldest first (at most ten).
    pub recent_events: Vec<MonitorEvent>,
    pub stats: MonitorStats,
    /// Number of events currently buffered.
    pub event_count: usize,
    /// Injections started but not yet completed.
    pub active_injections: usize,
}

/// Events shown on the dashboard snapshot.
const DASHBOARD_RECENT: usize = 10;

#[derive(Default)]
struct MonitorState {
    events: VecDeque<MonitorEvent>,
    stats: MonitorStats,
    /// Injection id -> start time, for duration aggregation.
    active: HashMap<String, DateTime<Utc>>,
}

/// Published read-only view, swapped atomically after every write.
struct MonitorView {
    events: Vec<MonitorEvent>,
    stats: MonitorStats,
    active_injections: usize,
}

/// Bounded, concurrent injection monitor.
///
/// One instance is shared by all pipeline invocations (injected
/// explicitly, never a global).
pub struct InjectionMonitor {
    max_events: usize,
    state: Mutex<MonitorState>,
    view: ArcSwap<MonitorView>,
}

impl std::fmt::Debug for InjectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionMonitor")
            .field("max_events", &self.max_events)
            .finish_non_exhaustive()
    }
}

impl InjectionMonitor {
    /// Create a monitor with a bounded ring buffer of `max_events`.
    pub fn new(max_events: usize) -> Self {
        Self {
            max_events: max_events.max(1),
            state: Mutex::new(MonitorState::default()),
            view: ArcSwap::from_pointee(MonitorView {
                events: Vec::new(),
                stats: MonitorStats::default(),
                active_injections: 0,
            }),
        }
    }

    /// Record one pipeline event and update aggregates.
    pub fn record(
        &self,
        injection_id: &str,
        model_id: &str,
        stage: StepKind,
        data: serde_json::Value,
    ) {
        let event = MonitorEvent {
            timestamp: Utc::now(),
            injection_id: injection_id.to_string(),
            model_id: model_id.to_string(),
            stage,
            data,
        };

        let Ok(mut state) = self.state.lock() else {
            warn!("monitor state poisoned, dropping event");
            return;
        };

        self.update_stats(&mut state, &event);

        if state.events.len() == self.max_events {
            state.events.pop_front();
        }
        state.events.push_back(event);

        self.publish(&state);
    }

    /// Dashboard snapshot: recent events plus aggregates. Lock-free.
    pub fn snapshot(&self) -> DashboardView {
        let view = self.view.load();
        let recent_start = view.events.len().saturating_sub(DASHBOARD_RECENT);
        DashboardView {
            recent_events: view.events[recent_start..].to_vec(),
            stats: view.stats.clone(),
            event_count: view.events.len(),
            active_injections: view.active_injections,
        }
    }

    /// Replay all buffered events for one injection, in arrival order.
    ///
    /// Only events still inside the ring buffer are returned.
    pub fn replay(&self, injection_id: &str) -> Vec<MonitorEvent> {
        self.view
            .load()
            .events
            .iter()
            .filter(|e| e.injection_id == injection_id)
            .cloned()
            .collect()
    }

    /// Per-stage counts over the buffered events, plus the most recent
    /// start, for the dashboard's activity summary.
    pub fn recent_activity(&self) -> (HashMap<StepKind, usize>, Option<MonitorEvent>) {
        let view = self.view.load();
        let mut counts: HashMap<StepKind, usize> = HashMap::new();
        for event in &view.events {
            *counts.entry(event.stage).or_insert(0) += 1;
        }
        let last_start = view
            .events
            .iter()
            .rev()
            .find(|e| e.stage == StepKind::Start)
            .cloned();
        (counts, last_start)
    }

    fn update_stats(&self, state: &mut MonitorState, event: &MonitorEvent) {
        match event.stage {
            StepKind::Start => {
                state.stats.total_injections += 1;
                *state
                    .stats
                    .models_used
                    .entry(event.model_id.clone())
                    .or_insert(0) += 1;
                state
                    .active
                    .insert(event.injection_id.clone(), event.timestamp);
            }
            StepKind::TemplateSelected => {
                if let Some(template) = event.data.get("selected_template").and_then(|t| t.as_str())
                {
                    *state
                        .stats
                        .templates_used
                        .entry(template.to_string())
                        .or_insert(0) += 1;
                }
            }
            StepKind::ContextRetrieved => {
                let found = event
                    .data
                    .get("contexts_found")
                    .and_then(|c| c.as_u64())
                    .unwrap_or(0) as f64;
                let completed =
                    state.stats.successful_injections + state.stats.failed_injections + 1;
                let mean = state.stats.average_context_entries;
                state.stats.average_context_entries =
                    mean + (found - mean) / completed as f64;
            }
            StepKind::Complete => {
                let success = event
                    .data
                    .get("success")
                    .and_then(|s| s.as_bool())
                    .unwrap_or(false);
                if success {
                    state.stats.successful_injections += 1;
                } else {
                    state.stats.failed_injections += 1;
                }

                if let Some(started) = state.active.remove(&event.injection_id) {
                    let duration_ms =
                        (event.timestamp - started).num_milliseconds().max(0) as f64;
                    let completed =
                        state.stats.successful_injections + state.stats.failed_injections;
                    let mean = state.stats.average_injection_ms;
                    state.stats.average_injection_ms =
                        mean + (duration_ms - mean) / completed as f64;
                }
            }
            _ => {}
        }
    }

    fn publish(&self, state: &MonitorState) {
        self.view.store(Arc::new(MonitorView {
            events: state.events.iter().cloned().collect(),
            stats: state.stats.clone(),
            active_injections: state.active.len(),
        }));
    }
}
