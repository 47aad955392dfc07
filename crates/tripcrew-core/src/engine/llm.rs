//! Single-completion LLM seam.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::EngineError;

/// One stateless completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Name of the task the completion is for; used in errors and logs.
    pub task: String,
    pub model: String,
    pub temperature: f32,
    /// Role identity, objective and persona.
    pub system_prompt: String,
    /// Task description, upstream context and expected output.
    pub prompt: String,
}

/// Stateless LLM client. Each call starts from a fresh context.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, EngineError>;
}
