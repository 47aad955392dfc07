//! Structured lifecycle events for crew runs.
//!
//! Every event carries an `event` field (`crew.started`, `task.completed`,
//! ...) and the run id, so a single run can be followed through the logs.

use tracing::{info, warn};
use uuid::Uuid;

/// RAII guard that enters a run-scoped span for the duration of a crew run.
///
/// ```ignore
/// let _span = CrewSpan::enter(&run_id);
/// // every event emitted here carries run_id
/// ```
pub struct CrewSpan {
    _span: tracing::span::EnteredSpan,
}

impl CrewSpan {
    pub fn enter(run_id: &Uuid) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// Span tagged with the run id, for instrumenting futures of that run.
pub fn run_span(run_id: &Uuid) -> tracing::Span {
    tracing::info_span!("tripcrew.run", run_id = %run_id)
}

/// Emit event: crew submitted with its task count and destination.
pub fn emit_crew_started(run_id: &Uuid, city: &str, task_count: usize) {
    info!(event = "crew.started", run_id = %run_id, city = %city, task_count = task_count);
}

pub fn emit_task_started(run_id: &Uuid, position: usize, task: &str, agent: &str) {
    info!(
        event = "task.started",
        run_id = %run_id,
        position = position,
        task = %task,
        agent = %agent,
    );
}

pub fn emit_task_completed(run_id: &Uuid, position: usize, task: &str, output_bytes: usize) {
    info!(
        event = "task.completed",
        run_id = %run_id,
        position = position,
        task = %task,
        output_bytes = output_bytes,
    );
}

/// Emit event: engine returned, with duration and number of task outputs.
pub fn emit_crew_finished(run_id: &Uuid, duration_ms: u64, task_outputs: usize) {
    info!(
        event = "crew.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        task_outputs = task_outputs,
    );
}

/// Emit event: engine failed; the error is propagated to the caller.
pub fn emit_crew_failed(run_id: &Uuid, error: &dyn std::fmt::Display) {
    warn!(event = "crew.failed", run_id = %run_id, error = %error);
}

/// Emit event: a plan section fell back to its placeholder.
pub fn emit_section_missing(run_id: &Uuid, section: &str) {
    warn!(event = "plan.section_missing", run_id = %run_id, section = %section);
}
