//! Task definitions for the four planning stages.
//!
//! Each constructor renders a description from [`TripInputs`] and binds the
//! task to a role. Descriptions are deterministic: the same inputs always
//! produce byte-identical text.

use serde::{Deserialize, Serialize};

use crate::inputs::TripInputs;
use crate::roles::{Role, RoleKind};

/// The four fixed task kinds, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CitySelection,
    CityResearch,
    Itinerary,
    Budget,
}

impl TaskKind {
    pub const ORDER: [TaskKind; 4] = [
        TaskKind::CitySelection,
        TaskKind::CityResearch,
        TaskKind::Itinerary,
        TaskKind::Budget,
    ];

    /// Unique key used to name the task and to extract its output.
    pub fn key(self) -> &'static str {
        match self {
            TaskKind::CitySelection => "city_selection",
            TaskKind::CityResearch => "city_research",
            TaskKind::Itinerary => "itinerary",
            TaskKind::Budget => "budget",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A unit of work submitted to an execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique within a batch.
    pub name: String,
    pub description: String,
    /// Role that performs the task. Must be present in the submitted roles.
    pub agent: RoleKind,
    pub expected_output: String,
    /// Names of upstream tasks whose output is interpolated into this task's
    /// context. Every entry must be submitted strictly earlier.
    #[serde(default)]
    pub context: Vec<String>,
}

impl TaskSpec {
    pub fn depends_on(&self, upstream: &str) -> bool {
        self.context.iter().any(|c| c == upstream)
    }
}

/// Shortlist three destinations from travel type, interests and season.
pub fn city_selection_task(agent: &Role, inputs: &TripInputs) -> TaskSpec {
    TaskSpec {
        name: TaskKind::CitySelection.key().to_string(),
        description: format!(
            "Analyze user preferences and select best destinations:\n\
             - Travel Type: {}\n\
             - Interests: {}\n\
             - Season: {}\n\
             Output: Provide 3 city options with a brief rationale for each.",
            inputs.travel_type,
            inputs.interests_label(),
            inputs.season,
        ),
        agent: agent.kind,
        expected_output: "Bullet-point list of 3 cities with 2-sentence explanations each."
            .to_string(),
        context: Vec::new(),
    }
}

/// Research attractions, cuisine, etiquette, lodging and transport for `city`.
pub fn city_research_task(agent: &Role, city: &str) -> TaskSpec {
    TaskSpec {
        name: TaskKind::CityResearch.key().to_string(),
        description: format!(
            "Provide detailed insights about {city} including:\n\
             - Top 5 attractions\n\
             - Local cuisine highlights\n\
             - Cultural norms/etiquette\n\
             - Recommended accommodation areas\n\
             - Transportation tips"
        ),
        agent: agent.kind,
        expected_output: "Organized sections with clear headings and bullet points.".to_string(),
        context: Vec::new(),
    }
}

/// Day-by-day schedule for the trip duration in `city`.
pub fn itinerary_task(agent: &Role, inputs: &TripInputs, city: &str) -> TaskSpec {
    TaskSpec {
        name: TaskKind::Itinerary.key().to_string(),
        description: format!(
            "Create a {}-day itinerary for {city} including:\n\
             - Daily schedule with time allocations\n\
             - Activity sequencing\n\
             - Transportation between locations\n\
             - Meal planning suggestions",
            inputs.duration,
        ),
        agent: agent.kind,
        expected_output: "Day-by-day table format with time slots and activity details."
            .to_string(),
        context: Vec::new(),
    }
}

/// Itemized costs for the chosen bracket, fed by the itinerary's output.
pub fn budget_task(agent: &Role, inputs: &TripInputs, itinerary: &TaskSpec) -> TaskSpec {
    TaskSpec {
        name: TaskKind::Budget.key().to_string(),
        description: format!(
            "Create a budget plan for the selected budget range ({}) covering:\n\
             - Accommodation costs\n\
             - Transportation expenses\n\
             - Activity fees\n\
             - Meal budget\n\
             - Emergency funds allocation",
            inputs.budget,
        ),
        agent: agent.kind,
        expected_output: "Itemized budget table with total cost analysis.".to_string(),
        context: vec![itinerary.name.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InferenceConfig, DEFAULT_MODEL};
    use crate::inputs::{BudgetBracket, Interest, Season, TravelType};
    use crate::roles::RoleRegistry;
    use std::sync::Arc;

    fn registry() -> RoleRegistry {
        RoleRegistry::standard(Arc::new(InferenceConfig::new(DEFAULT_MODEL, "k")))
    }

    fn lisbon() -> TripInputs {
        TripInputs {
            travel_type: TravelType::Adventure,
            interests: [Interest::Nature, Interest::Art].into_iter().collect(),
            season: Season::Winter,
            duration: 9,
            budget: BudgetBracket::Premium,
            city: "Lisbon".to_string(),
        }
    }

    #[test]
    fn test_city_selection_embeds_every_preference() {
        let registry = registry();
        let task = city_selection_task(registry.get(RoleKind::CitySelector).unwrap(), &lisbon());
        assert_eq!(task.name, "city_selection");
        assert!(task.description.contains("Travel Type: Adventure"));
        assert!(task.description.contains("Interests: Nature, Art"));
        assert!(task.description.contains("Season: Winter"));
        assert_eq!(task.agent, RoleKind::CitySelector);
    }

    #[test]
    fn test_city_research_embeds_city() {
        let registry = registry();
        let task = city_research_task(registry.get(RoleKind::LocalExpert).unwrap(), "Kyoto");
        assert!(task.description.starts_with("Provide detailed insights about Kyoto"));
        assert!(task.description.contains("Transportation tips"));
        assert!(task.context.is_empty());
    }

    #[test]
    fn test_itinerary_embeds_duration_and_city() {
        let registry = registry();
        let inputs = lisbon();
        let task = itinerary_task(
            registry.get(RoleKind::TravelPlanner).unwrap(),
            &inputs,
            &inputs.city,
        );
        assert!(task.description.contains("Create a 9-day itinerary for Lisbon"));
    }

    #[test]
    fn test_budget_embeds_bracket_and_depends_on_itinerary() {
        let registry = registry();
        let inputs = lisbon();
        let itinerary = itinerary_task(
            registry.get(RoleKind::TravelPlanner).unwrap(),
            &inputs,
            &inputs.city,
        );
        let budget = budget_task(
            registry.get(RoleKind::BudgetManager).unwrap(),
            &inputs,
            &itinerary,
        );
        assert!(budget.description.contains("($2000-$5000)"));
        assert!(budget.depends_on("itinerary"));
        assert_eq!(budget.context, vec!["itinerary".to_string()]);
    }

    #[test]
    fn test_descriptions_are_deterministic() {
        let registry = registry();
        let role = registry.get(RoleKind::CitySelector).unwrap();
        assert_eq!(
            city_selection_task(role, &lisbon()),
            city_selection_task(role, &lisbon())
        );
    }

    #[test]
    fn test_task_kind_order_matches_keys() {
        let keys: Vec<&str> = TaskKind::ORDER.iter().map(|k| k.key()).collect();
        assert_eq!(keys, vec!["city_selection", "city_research", "itinerary", "budget"]);
    }
}
