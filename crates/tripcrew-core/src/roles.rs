//! Role vocabulary: `RoleKind`, `Role`, `RoleRegistry`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;

/// The four role archetypes in a travel-planning crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    CitySelector,
    LocalExpert,
    TravelPlanner,
    BudgetManager,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoleKind::CitySelector => "city_selector",
            RoleKind::LocalExpert => "local_expert",
            RoleKind::TravelPlanner => "travel_planner",
            RoleKind::BudgetManager => "budget_manager",
        };
        write!(f, "{s}")
    }
}

/// A persona that parameterizes one LLM call context.
///
/// Immutable once built. The inference binding is shared by every role of a
/// registry through the same `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub kind: RoleKind,
    /// Identity label, e.g. "City Selection Expert".
    pub identity: &'static str,
    pub objective: &'static str,
    /// Backstory injected into the system prompt.
    pub persona: &'static str,
    #[serde(skip)]
    pub inference: Arc<InferenceConfig>,
}

/// The fixed set of roles for one crew run.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl RoleRegistry {
    /// Build the four standard roles, all bound to `inference`.
    pub fn standard(inference: Arc<InferenceConfig>) -> Self {
        let role = |kind: RoleKind,
                    identity: &'static str,
                    objective: &'static str,
                    persona: &'static str| Role {
            kind,
            identity,
            objective,
            persona,
            inference: Arc::clone(&inference),
        };

        let roles = vec![
            role(
                RoleKind::CitySelector,
                "City Selection Expert",
                "Identify best cities to visit based on user preferences",
                "An expert travel geographer with extensive knowledge about world cities \
                 and their cultural, historical, and entertainment offerings",
            ),
            role(
                RoleKind::LocalExpert,
                "Local Destination Expert",
                "Provide detailed insights about selected cities including top attractions, \
                 local customs, and hidden gems",
                "A knowledgeable local guide with first-hand experience of the city's \
                 culture and attractions",
            ),
            role(
                RoleKind::TravelPlanner,
                "Professional Travel Planner",
                "Create detailed day-by-day itineraries with time allocations, \
                 transportation options, and activity sequencing",
                "An experienced travel coordinator with perfect logistical planning skills",
            ),
            role(
                RoleKind::BudgetManager,
                "Travel Budget Specialist",
                "Optimize travel plans to stay within budget while maximizing experience quality",
                "A financial planner specializing in travel budgets and cost optimization",
            ),
        ];

        RoleRegistry { roles }
    }

    /// Look up a role by kind.
    pub fn get(&self, kind: RoleKind) -> Option<&Role> {
        self.roles.iter().find(|r| r.kind == kind)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn into_roles(self) -> Vec<Role> {
        self.roles
    }
}
