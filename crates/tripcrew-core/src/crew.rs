//! Crew assembly, batch validation and submission.
//!
//! A [`TripCrew`] owns one run: it builds the roles and the four tasks,
//! validates the batch, hands it to an [`ExecutionEngine`] in a single
//! awaited call and normalizes what comes back. Engine failures propagate
//! unchanged; nothing is retried.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{instrument, Instrument};
use uuid::Uuid;

use crate::config::InferenceConfig;
use crate::engine::{ExecutionEngine, ExecutionResult};
use crate::error::{Result, TripError};
use crate::inputs::TripInputs;
use crate::metrics::METRICS;
use crate::normalizer::{normalize, PlanOutcome};
use crate::obs::{self, CrewSpan};
use crate::roles::{Role, RoleKind, RoleRegistry};
use crate::tasks::{budget_task, city_research_task, city_selection_task, itinerary_task, TaskSpec};

/// Roles and tasks submitted together, tasks in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct CrewBatch {
    pub roles: Vec<Role>,
    pub tasks: Vec<TaskSpec>,
}

impl CrewBatch {
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Check that `tasks` can be submitted with `roles`.
///
/// Rejects an empty batch, duplicate task names, tasks whose agent has no
/// role, and context references that do not name a task submitted strictly
/// earlier. The last rule also rules out cycles, so any batch that passes is
/// a DAG executable in submission order.
pub fn validate_batch(roles: &[Role], tasks: &[TaskSpec]) -> Result<()> {
    if tasks.is_empty() {
        return Err(TripError::InvalidBatch("task list is empty".to_string()));
    }

    let role_kinds: HashSet<RoleKind> = roles.iter().map(|r| r.kind).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for task in tasks {
        if !role_kinds.contains(&task.agent) {
            return Err(TripError::InvalidBatch(format!(
                "task {} is assigned to {}, which is not in the crew",
                task.name, task.agent
            )));
        }

        for upstream in &task.context {
            if !seen.contains(upstream.as_str()) {
                return Err(TripError::InvalidBatch(format!(
                    "task {} depends on {}, which is not submitted before it",
                    task.name, upstream
                )));
            }
        }

        if !seen.insert(task.name.as_str()) {
            return Err(TripError::InvalidBatch(format!(
                "duplicate task name {}",
                task.name
            )));
        }
    }
    Ok(())
}

/// One travel-planning run.
#[derive(Debug, Clone)]
pub struct TripCrew {
    inputs: TripInputs,
    inference: Arc<InferenceConfig>,
}

impl TripCrew {
    /// Validate inputs and configuration up front; nothing is submitted here.
    pub fn new(inputs: TripInputs, inference: InferenceConfig) -> Result<Self> {
        inference.validate()?;
        inputs.validate()?;
        Ok(TripCrew {
            inputs,
            inference: Arc::new(inference),
        })
    }

    pub fn inputs(&self) -> &TripInputs {
        &self.inputs
    }

    /// Build roles and tasks in the fixed order
    /// `[city_selection, city_research, itinerary, budget]`.
    pub fn assemble(&self) -> Result<CrewBatch> {
        let registry = RoleRegistry::standard(Arc::clone(&self.inference));
        let role = |kind: RoleKind| {
            registry.get(kind).ok_or_else(|| {
                TripError::InvalidBatch(format!("role {kind} missing from registry"))
            })
        };

        let city = self.inputs.city.trim();
        let select_cities = city_selection_task(role(RoleKind::CitySelector)?, &self.inputs);
        let research_city = city_research_task(role(RoleKind::LocalExpert)?, city);
        let create_itinerary = itinerary_task(role(RoleKind::TravelPlanner)?, &self.inputs, city);
        let plan_budget = budget_task(
            role(RoleKind::BudgetManager)?,
            &self.inputs,
            &create_itinerary,
        );

        let batch = CrewBatch {
            roles: registry.roles().to_vec(),
            tasks: vec![select_cities, research_city, create_itinerary, plan_budget],
        };
        validate_batch(&batch.roles, &batch.tasks)?;
        Ok(batch)
    }

    /// Submit the batch and wait for every task.
    #[instrument(skip(self, engine), fields(city = %self.inputs.city))]
    pub async fn run<E>(&self, engine: &E) -> Result<ExecutionResult>
    where
        E: ExecutionEngine + ?Sized,
    {
        let batch = self.assemble()?;
        let run_id = Uuid::new_v4();

        METRICS.inc_crews_started();
        obs::emit_crew_started(&run_id, &self.inputs.city, batch.tasks.len());

        let submitted = engine
            .kickoff(run_id, &batch.roles, &batch.tasks)
            .instrument(obs::run_span(&run_id))
            .await;

        match submitted {
            Ok(result) => {
                obs::emit_crew_finished(&run_id, result.duration_ms(), result.task_count());
                Ok(result)
            }
            Err(e) => {
                METRICS.inc_engine_failures();
                obs::emit_crew_failed(&run_id, &e);
                Err(TripError::Engine(e))
            }
        }
    }

    /// Run the crew and normalize the result into a [`PlanOutcome`].
    ///
    /// Returns `Err` only when the run itself fails; missing sections yield
    /// [`PlanOutcome::Degraded`].
    pub async fn plan<E>(&self, engine: &E) -> Result<(ExecutionResult, PlanOutcome)>
    where
        E: ExecutionEngine + ?Sized,
    {
        let result = self.run(engine).await?;
        let outcome = {
            let _span = CrewSpan::enter(&result.run_id);
            normalize(&result)
        };
        Ok((result, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;

    fn crew() -> TripCrew {
        TripCrew::new(
            TripInputs::for_city("Lisbon"),
            InferenceConfig::new(DEFAULT_MODEL, "k"),
        )
        .unwrap()
    }

    fn roles() -> Vec<Role> {
        RoleRegistry::standard(Arc::new(InferenceConfig::new(DEFAULT_MODEL, "k"))).into_roles()
    }

    fn task(name: &str, agent: RoleKind, context: &[&str]) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            description: String::new(),
            agent,
            expected_output: String::new(),
            context: context.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_assemble_preserves_fixed_order() {
        let batch = crew().assemble().unwrap();
        assert_eq!(
            batch.task_names(),
            vec!["city_selection", "city_research", "itinerary", "budget"]
        );
        assert_eq!(batch.roles.len(), 4);
    }

    #[test]
    fn test_assemble_wires_budget_to_itinerary() {
        let batch = crew().assemble().unwrap();
        assert_eq!(batch.tasks[3].context, vec!["itinerary".to_string()]);
    }

    #[test]
    fn test_assemble_trims_city() {
        let crew = TripCrew::new(
            TripInputs::for_city("  Porto "),
            InferenceConfig::new(DEFAULT_MODEL, "k"),
        )
        .unwrap();
        let batch = crew.assemble().unwrap();
        assert!(batch.tasks[1]
            .description
            .starts_with("Provide detailed insights about Porto including"));
    }

    #[test]
    fn test_new_rejects_blank_credential_before_anything_runs() {
        let err = TripCrew::new(
            TripInputs::for_city("Lisbon"),
            InferenceConfig::new(DEFAULT_MODEL, " "),
        )
        .unwrap_err();
        assert!(matches!(err, TripError::Configuration(_)));
    }

    #[test]
    fn test_new_rejects_invalid_inputs() {
        let mut inputs = TripInputs::for_city("Lisbon");
        inputs.duration = 30;
        let err = TripCrew::new(inputs, InferenceConfig::new(DEFAULT_MODEL, "k")).unwrap_err();
        assert!(matches!(err, TripError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        let err = validate_batch(&roles(), &[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_rejects_unknown_agent() {
        let roles: Vec<Role> = roles()
            .into_iter()
            .filter(|r| r.kind != RoleKind::BudgetManager)
            .collect();
        let err = validate_batch(&roles, &[task("budget", RoleKind::BudgetManager, &[])])
            .unwrap_err();
        assert!(err.to_string().contains("budget_manager"));
    }

    #[test]
    fn test_validate_rejects_forward_reference() {
        let tasks = vec![
            task("budget", RoleKind::BudgetManager, &["itinerary"]),
            task("itinerary", RoleKind::TravelPlanner, &[]),
        ];
        let err = validate_batch(&roles(), &tasks).unwrap_err();
        assert!(matches!(err, TripError::InvalidBatch(_)));
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let tasks = vec![task("loop", RoleKind::TravelPlanner, &["loop"])];
        assert!(validate_batch(&roles(), &tasks).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let tasks = vec![
            task("itinerary", RoleKind::TravelPlanner, &[]),
            task("itinerary", RoleKind::TravelPlanner, &[]),
        ];
        let err = validate_batch(&roles(), &tasks).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_accepts_fan_in_dag() {
        let tasks = vec![
            task("a", RoleKind::CitySelector, &[]),
            task("b", RoleKind::LocalExpert, &[]),
            task("c", RoleKind::BudgetManager, &["a", "b"]),
        ];
        assert!(validate_batch(&roles(), &tasks).is_ok());
    }
}
