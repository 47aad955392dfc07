//! Markdown rendering of plans and task batches for terminal output.

use crate::crew::CrewBatch;
use crate::inputs::TripInputs;
use crate::normalizer::{PlanOutcome, PlanSection, TripPlan};

/// Shown after a plan has been rendered.
pub const COMPLETION_NOTICE: &str = "✅ Trip planning completed! Enjoy your journey!";

/// User-facing notice for a failed run.
pub fn failure_notice(reason: &str) -> String {
    format!("An error occurred while processing the results: {reason}")
}

fn push_plan(out: &mut String, plan: &TripPlan) {
    for section in PlanSection::ALL {
        out.push_str(&format!("## {}\n\n", section.title()));
        out.push_str(plan.text(section).trim_end());
        out.push_str("\n\n");
    }
}

/// Render a plan outcome as markdown.
pub fn render_plan_md(inputs: &TripInputs, outcome: &PlanOutcome) -> String {
    let mut out = String::new();
    out.push_str("# Your AI-Generated Travel Plan\n\n");
    out.push_str(&format!(
        "- city: {}\n- travel type: {}\n- interests: {}\n- season: {}\n- duration: {} days\n- budget: {}\n\n",
        inputs.city.trim(),
        inputs.travel_type,
        inputs.interests_label(),
        inputs.season,
        inputs.duration,
        inputs.budget,
    ));

    match outcome {
        PlanOutcome::Complete { plan } => {
            push_plan(&mut out, plan);
            out.push_str(COMPLETION_NOTICE);
            out.push('\n');
        }
        PlanOutcome::Degraded { plan, missing } => {
            push_plan(&mut out, plan);
            let keys: Vec<&str> = missing.iter().map(|s| s.key()).collect();
            out.push_str(&format!(
                "> Partial plan: no output for {}.\n\n",
                keys.join(", ")
            ));
            out.push_str(COMPLETION_NOTICE);
            out.push('\n');
        }
        PlanOutcome::Failed { reason } => {
            out.push_str(&failure_notice(reason));
            out.push('\n');
        }
    }
    out
}

/// Render the roles and tasks of a batch without running it.
pub fn render_batch_md(batch: &CrewBatch) -> String {
    let mut out = String::new();
    out.push_str("# Crew\n\n## Roles\n");
    for role in &batch.roles {
        out.push_str(&format!(
            "- **{}** (`{}`): {}\n",
            role.identity, role.kind, role.objective
        ));
    }
    if let Some(role) = batch.roles.first() {
        out.push_str(&format!(
            "\nmodel: `{}` (temperature {})\n",
            role.inference.model, role.inference.temperature
        ));
    }

    out.push_str("\n## Tasks\n");
    for (position, task) in batch.tasks.iter().enumerate() {
        out.push_str(&format!(
            "\n### {}. {} (`{}`)\n\n",
            position + 1,
            task.name,
            task.agent
        ));
        out.push_str(&task.description);
        out.push_str(&format!("\n\nExpected output: {}\n", task.expected_output));
        if !task.context.is_empty() {
            out.push_str(&format!("Context from: {}\n", task.context.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InferenceConfig, DEFAULT_MODEL};
    use crate::crew::TripCrew;
    use crate::normalizer::SectionContent;
    use uuid::Uuid;

    fn plan(budget: SectionContent) -> TripPlan {
        TripPlan {
            run_id: Uuid::new_v4(),
            city_selection: SectionContent::Generated("A".to_string()),
            city_research: SectionContent::Generated("B".to_string()),
            itinerary: SectionContent::Generated("C".to_string()),
            budget,
        }
    }

    #[test]
    fn test_complete_plan_renders_all_headings_in_order() {
        let outcome = PlanOutcome::Complete {
            plan: plan(SectionContent::Generated("D".to_string())),
        };
        let md = render_plan_md(&TripInputs::for_city("Lisbon"), &outcome);
        let cities = md.find("## Recommended Cities").unwrap();
        let insights = md.find("## Destination Insights").unwrap();
        let itinerary = md.find("## Detailed Itinerary").unwrap();
        let budget = md.find("## Budget Breakdown").unwrap();
        assert!(cities < insights && insights < itinerary && itinerary < budget);
        assert!(md.ends_with(&format!("{COMPLETION_NOTICE}\n")));
    }

    #[test]
    fn test_degraded_plan_shows_placeholder_and_notice() {
        let outcome = PlanOutcome::Degraded {
            plan: plan(SectionContent::Missing),
            missing: vec![PlanSection::Budget],
        };
        let md = render_plan_md(&TripInputs::for_city("Lisbon"), &outcome);
        assert!(md.contains("❌ No budget breakdown available."));
        assert!(md.contains("Partial plan: no output for budget."));
    }

    #[test]
    fn test_failed_outcome_renders_only_the_notice() {
        let outcome = PlanOutcome::Failed {
            reason: "engine error: quota".to_string(),
        };
        let md = render_plan_md(&TripInputs::for_city("Lisbon"), &outcome);
        assert!(md.contains(
            "An error occurred while processing the results: engine error: quota"
        ));
        assert!(!md.contains("## Recommended Cities"));
    }

    #[test]
    fn test_batch_preview_lists_tasks_and_context() {
        let crew = TripCrew::new(
            TripInputs::for_city("Lisbon"),
            InferenceConfig::new(DEFAULT_MODEL, "secret-key"),
        )
        .unwrap();
        let md = render_batch_md(&crew.assemble().unwrap());
        assert!(md.contains("### 1. city_selection (`city_selector`)"));
        assert!(md.contains("### 4. budget (`budget_manager`)"));
        assert!(md.contains("Context from: itinerary"));
        assert!(md.contains(DEFAULT_MODEL));
        assert!(!md.contains("secret-key"));
    }
}
