//! TripCrew Core Library
//!
//! Four LLM-backed roles (city selector, local expert, travel planner,
//! budget manager) run as one ordered task batch. The budget task consumes
//! the itinerary's output; the result is normalized into a four-section
//! [`TripPlan`].
//!
//! # Module layout
//!
//! - [`inputs`]: `TripInputs` and its enums
//! - [`roles`]: `RoleKind`, `Role`, `RoleRegistry`
//! - [`tasks`]: `TaskSpec` and the four task constructors
//! - [`crew`]: `TripCrew`, `CrewBatch`, `validate_batch`
//! - [`engine`]: `ExecutionEngine`, `SequentialEngine`, `GeminiClient`
//! - [`normalizer`]: `normalize`, `TripPlan`, `PlanOutcome`
//! - [`render`]: markdown output for the CLI

pub mod config;
pub mod crew;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod metrics;
pub mod normalizer;
pub mod obs;
pub mod render;
pub mod roles;
pub mod tasks;
pub mod telemetry;

pub use config::InferenceConfig;
pub use crew::{validate_batch, CrewBatch, TripCrew};
pub use engine::{
    CompletionRequest, ExecutionEngine, ExecutionResult, GeminiClient, LlmClient,
    SequentialEngine, TaskOutput,
};
pub use error::{ConfigError, EngineError, Result, TripError};
pub use inputs::{BudgetBracket, Interest, Season, TravelType, TripInputs};
pub use metrics::METRICS;
pub use normalizer::{normalize, PlanOutcome, PlanSection, SectionContent, TripPlan};
pub use obs::CrewSpan;
pub use render::{render_batch_md, render_plan_md};
pub use roles::{Role, RoleKind, RoleRegistry};
pub use tasks::{TaskKind, TaskSpec};
pub use telemetry::init_tracing;

/// TripCrew version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
