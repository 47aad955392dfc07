//! Sequential task execution over an [`LlmClient`].
//!
//! Tasks run one at a time in submission order. Before a task runs, the raw
//! output of every task named in its `context` is rendered into its prompt,
//! so a downstream task always sees its upstream text.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::engine::llm::{CompletionRequest, LlmClient};
use crate::engine::{ExecutionEngine, ExecutionResult, TaskOutput};
use crate::error::EngineError;
use crate::metrics::METRICS;
use crate::obs;
use crate::roles::Role;
use crate::tasks::TaskSpec;

/// Engine that runs each task as one completion, in order.
pub struct SequentialEngine<C> {
    client: C,
}

impl<C: LlmClient> SequentialEngine<C> {
    pub fn new(client: C) -> Self {
        SequentialEngine { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

/// System prompt carrying the role's identity, objective and persona.
pub fn render_system_prompt(role: &Role) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        role.identity, role.persona, role.objective
    )
}

/// User prompt for `task`, with each `(name, output)` upstream pair rendered
/// as a context block ahead of the expected-output criteria.
pub fn render_task_prompt(task: &TaskSpec, context: &[(&str, &str)]) -> String {
    let mut out = String::new();
    out.push_str("Current Task: ");
    out.push_str(&task.description);
    out.push_str("\n\n");

    if !context.is_empty() {
        out.push_str("This is the context you're working with:\n");
        for (name, text) in context {
            out.push_str(&format!("--- {name} ---\n{text}\n"));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "This is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.expected_output
    ));
    out
}

#[async_trait]
impl<C: LlmClient> ExecutionEngine for SequentialEngine<C> {
    #[instrument(skip(self, roles, tasks), fields(run_id = %run_id, tasks = tasks.len()))]
    async fn kickoff(
        &self,
        run_id: Uuid,
        roles: &[Role],
        tasks: &[TaskSpec],
    ) -> Result<ExecutionResult, EngineError> {
        let started_at = Utc::now();
        let mut completed: HashMap<&str, String> = HashMap::new();
        let mut outputs = Vec::with_capacity(tasks.len());

        for (position, task) in tasks.iter().enumerate() {
            let role = roles.iter().find(|r| r.kind == task.agent).ok_or_else(|| {
                EngineError::Inference {
                    task: task.name.clone(),
                    message: format!("no role bound for agent {}", task.agent),
                }
            })?;

            let mut context = Vec::with_capacity(task.context.len());
            for upstream in &task.context {
                let text = completed.get(upstream.as_str()).ok_or_else(|| {
                    EngineError::MissingContext {
                        task: task.name.clone(),
                        upstream: upstream.clone(),
                    }
                })?;
                context.push((upstream.as_str(), text.as_str()));
            }

            obs::emit_task_started(&run_id, position, &task.name, role.identity);

            let request = CompletionRequest {
                task: task.name.clone(),
                model: role.inference.model.clone(),
                temperature: role.inference.temperature,
                system_prompt: render_system_prompt(role),
                prompt: render_task_prompt(task, &context),
            };
            debug!(task = %task.name, context = context.len(), "dispatching completion");

            let raw = self.client.complete(request).await?;
            if raw.trim().is_empty() {
                return Err(EngineError::EmptyResponse {
                    task: task.name.clone(),
                });
            }

            obs::emit_task_completed(&run_id, position, &task.name, raw.len());
            METRICS.inc_tasks_completed();

            outputs.push(TaskOutput::named(
                &task.name,
                role.identity,
                &task.description,
                &raw,
            ));
            completed.insert(task.name.as_str(), raw);
        }

        Ok(ExecutionResult::from_outputs(run_id, started_at, outputs))
    }
}
