//! Execution engine boundary.
//!
//! The crew depends only on [`ExecutionEngine`]: it hands over roles and an
//! ordered task batch and receives an [`ExecutionResult`]. How tasks are
//! scheduled is up to the implementation.
//!
//! - [`llm`]: `LlmClient`, the single-completion seam used by engines
//! - [`sequential`]: `SequentialEngine`, runs tasks in submission order
//! - [`gemini`]: `GeminiClient`, REST client for the Gemini API

pub mod gemini;
pub mod llm;
pub mod sequential;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::roles::Role;
use crate::tasks::TaskSpec;

pub use gemini::GeminiClient;
pub use llm::{CompletionRequest, LlmClient};
pub use sequential::SequentialEngine;

/// Raw text produced for one submitted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Name of the task that produced this output, when the engine reports it.
    pub name: Option<String>,
    /// Identity of the role that ran the task.
    pub agent: String,
    pub description: String,
    pub raw: String,
}

impl TaskOutput {
    pub fn named(name: &str, agent: &str, description: &str, raw: &str) -> Self {
        TaskOutput {
            name: Some(name.to_string()),
            agent: agent.to_string(),
            description: description.to_string(),
            raw: raw.to_string(),
        }
    }

    /// An output that carries only text, as engines without task naming report it.
    pub fn unnamed(raw: &str) -> Self {
        TaskOutput {
            name: None,
            agent: String::new(),
            description: String::new(),
            raw: raw.to_string(),
        }
    }
}

/// Everything an engine reports for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub run_id: Uuid,
    /// Output of the last task, as a single string.
    pub raw: String,
    /// Per-task outputs aligned with submission order. `None` when the engine
    /// does not expose them.
    pub tasks_output: Option<Vec<TaskOutput>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Build a result from per-task outputs; `raw` is the last output's text.
    pub fn from_outputs(run_id: Uuid, started_at: DateTime<Utc>, outputs: Vec<TaskOutput>) -> Self {
        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        ExecutionResult {
            run_id,
            raw,
            tasks_output: Some(outputs),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A result that only carries the final text.
    pub fn raw_only(run_id: Uuid, raw: &str) -> Self {
        let now = Utc::now();
        ExecutionResult {
            run_id,
            raw: raw.to_string(),
            tasks_output: None,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks_output.as_ref().map_or(0, Vec::len)
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Runs a batch of tasks against a set of roles.
///
/// Implementations return once every task has produced output or fail with
/// [`EngineError`]. The caller guarantees the batch is valid (see
/// [`crate::crew::validate_batch`]).
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn kickoff(
        &self,
        run_id: Uuid,
        roles: &[Role],
        tasks: &[TaskSpec],
    ) -> Result<ExecutionResult, EngineError>;
}
