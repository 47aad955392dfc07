//! Result normalization: engine output → four-section [`TripPlan`].
//!
//! Sections are looked up by task name. Outputs that carry no name fall back
//! to their submission position. A section with no usable output becomes
//! [`SectionContent::Missing`]; the run still yields a displayable plan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{ExecutionResult, TaskOutput};
use crate::metrics::METRICS;
use crate::obs;
use crate::tasks::TaskKind;

/// The four fixed sections of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSection {
    CitySelection,
    CityResearch,
    Itinerary,
    Budget,
}

impl PlanSection {
    pub const ALL: [PlanSection; 4] = [
        PlanSection::CitySelection,
        PlanSection::CityResearch,
        PlanSection::Itinerary,
        PlanSection::Budget,
    ];

    /// Task whose output fills this section.
    pub fn task(self) -> TaskKind {
        match self {
            PlanSection::CitySelection => TaskKind::CitySelection,
            PlanSection::CityResearch => TaskKind::CityResearch,
            PlanSection::Itinerary => TaskKind::Itinerary,
            PlanSection::Budget => TaskKind::Budget,
        }
    }

    pub fn key(self) -> &'static str {
        self.task().key()
    }

    /// Heading shown above the section.
    pub fn title(self) -> &'static str {
        match self {
            PlanSection::CitySelection => "Recommended Cities",
            PlanSection::CityResearch => "Destination Insights",
            PlanSection::Itinerary => "Detailed Itinerary",
            PlanSection::Budget => "Budget Breakdown",
        }
    }

    /// Text displayed when the section has no generated content.
    pub fn placeholder(self) -> &'static str {
        match self {
            PlanSection::CitySelection => "❌ No city selection found.",
            PlanSection::CityResearch => "❌ No city research found.",
            PlanSection::Itinerary => "❌ No itinerary generated.",
            PlanSection::Budget => "❌ No budget breakdown available.",
        }
    }
}

impl std::fmt::Display for PlanSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum SectionContent {
    Generated(String),
    Missing,
}

impl SectionContent {
    pub fn is_missing(&self) -> bool {
        matches!(self, SectionContent::Missing)
    }
}

/// Normalized plan with one entry per [`PlanSection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlan {
    pub run_id: Uuid,
    pub city_selection: SectionContent,
    pub city_research: SectionContent,
    pub itinerary: SectionContent,
    pub budget: SectionContent,
}

impl TripPlan {
    pub fn get(&self, section: PlanSection) -> &SectionContent {
        match section {
            PlanSection::CitySelection => &self.city_selection,
            PlanSection::CityResearch => &self.city_research,
            PlanSection::Itinerary => &self.itinerary,
            PlanSection::Budget => &self.budget,
        }
    }

    /// Generated text, or the section's placeholder.
    pub fn text(&self, section: PlanSection) -> &str {
        match self.get(section) {
            SectionContent::Generated(text) => text,
            SectionContent::Missing => section.placeholder(),
        }
    }

    /// Sections that fell back to their placeholder, in section order.
    pub fn missing(&self) -> Vec<PlanSection> {
        PlanSection::ALL
            .into_iter()
            .filter(|s| self.get(*s).is_missing())
            .collect()
    }

    /// `{key → text}` view used for display.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        PlanSection::ALL
            .into_iter()
            .map(|s| (s.key(), self.text(s).to_string()))
            .collect()
    }
}

/// Outcome of a crew run as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Every section carries generated content.
    Complete { plan: TripPlan },
    /// At least one section fell back to its placeholder.
    Degraded {
        plan: TripPlan,
        missing: Vec<PlanSection>,
    },
    /// The run failed before a plan could be built.
    Failed { reason: String },
}

impl PlanOutcome {
    pub fn failed(error: &dyn std::fmt::Display) -> Self {
        PlanOutcome::Failed {
            reason: error.to_string(),
        }
    }

    pub fn plan(&self) -> Option<&TripPlan> {
        match self {
            PlanOutcome::Complete { plan } | PlanOutcome::Degraded { plan, .. } => Some(plan),
            PlanOutcome::Failed { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PlanOutcome::Complete { .. })
    }
}

/// True when `output` is tagged with one of the four section keys.
fn names_a_section(output: &TaskOutput) -> bool {
    output
        .name
        .as_deref()
        .is_some_and(|name| PlanSection::ALL.iter().any(|s| s.key() == name))
}

fn find_output<'a>(
    outputs: &'a [TaskOutput],
    position: usize,
    section: PlanSection,
) -> Option<&'a TaskOutput> {
    outputs
        .iter()
        .find(|o| o.name.as_deref() == Some(section.key()))
        .or_else(|| outputs.get(position).filter(|o| !names_a_section(o)))
}

fn section_content(
    result: &ExecutionResult,
    position: usize,
    section: PlanSection,
) -> SectionContent {
    let output = result
        .tasks_output
        .as_deref()
        .and_then(|outputs| find_output(outputs, position, section));

    match output {
        Some(o) if !o.raw.trim().is_empty() => SectionContent::Generated(o.raw.clone()),
        _ => {
            obs::emit_section_missing(&result.run_id, section.key());
            METRICS.inc_sections_missing();
            SectionContent::Missing
        }
    }
}

/// Map an [`ExecutionResult`] onto the four plan sections.
///
/// Each section takes the output named after its key. Failing that, it takes
/// the output at its position, unless that output is named after another
/// section.
///
/// Never fails: absent, out-of-range or blank outputs degrade their section
/// to a placeholder. [`SequentialEngine`](crate::engine::SequentialEngine)
/// rejects blank completions itself, so blank entries only reach here from
/// other engines. Normalizing the same result twice yields equal outcomes.
pub fn normalize(result: &ExecutionResult) -> PlanOutcome {
    let [city_selection, city_research, itinerary, budget] =
        [0, 1, 2, 3].map(|position| section_content(result, position, PlanSection::ALL[position]));

    let plan = TripPlan {
        run_id: result.run_id,
        city_selection,
        city_research,
        itinerary,
        budget,
    };

    let missing = plan.missing();
    if missing.is_empty() {
        PlanOutcome::Complete { plan }
    } else {
        PlanOutcome::Degraded { plan, missing }
    }
}
