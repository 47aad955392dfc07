//! Trip preferences collected from the user.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};

/// Shortest trip accepted, in days.
pub const MIN_DURATION_DAYS: u8 = 1;
/// Longest trip accepted, in days.
pub const MAX_DURATION_DAYS: u8 = 14;
/// Duration used when the caller does not pick one.
pub const DEFAULT_DURATION_DAYS: u8 = 7;

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ' ' | '_' | ','))
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown_value(kind: &str, raw: &str, accepted: &[&str]) -> TripError {
    TripError::InvalidInput(format!(
        "unknown {kind} '{raw}' (expected one of: {})",
        accepted.join(", ")
    ))
}

/// Purpose of the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TravelType {
    #[default]
    Leisure,
    Business,
    Adventure,
    Cultural,
}

impl TravelType {
    pub const ALL: [TravelType; 4] = [
        TravelType::Leisure,
        TravelType::Business,
        TravelType::Adventure,
        TravelType::Cultural,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TravelType::Leisure => "Leisure",
            TravelType::Business => "Business",
            TravelType::Adventure => "Adventure",
            TravelType::Cultural => "Cultural",
        }
    }
}

impl fmt::Display for TravelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TravelType {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        TravelType::ALL
            .into_iter()
            .find(|t| t.label().to_lowercase() == token)
            .ok_or_else(|| {
                let accepted: Vec<&str> = TravelType::ALL.iter().map(|t| t.label()).collect();
                unknown_value("travel type", s, &accepted)
            })
    }
}

/// Interest tags. Declaration order is the order used in task descriptions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Interest {
    History,
    Food,
    Nature,
    Art,
    Shopping,
    Nightlife,
}

impl Interest {
    pub const ALL: [Interest; 6] = [
        Interest::History,
        Interest::Food,
        Interest::Nature,
        Interest::Art,
        Interest::Shopping,
        Interest::Nightlife,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Interest::History => "History",
            Interest::Food => "Food",
            Interest::Nature => "Nature",
            Interest::Art => "Art",
            Interest::Shopping => "Shopping",
            Interest::Nightlife => "Nightlife",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interest {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        Interest::ALL
            .into_iter()
            .find(|i| i.label().to_lowercase() == token)
            .ok_or_else(|| {
                let accepted: Vec<&str> = Interest::ALL.iter().map(|i| i.label()).collect();
                unknown_value("interest", s, &accepted)
            })
    }
}

/// Season of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Summer,
    Winter,
    Spring,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Summer, Season::Winter, Season::Spring, Season::Fall];

    pub fn label(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        if token == "autumn" {
            return Ok(Season::Fall);
        }
        Season::ALL
            .into_iter()
            .find(|season| season.label().to_lowercase() == token)
            .ok_or_else(|| {
                let accepted: Vec<&str> = Season::ALL.iter().map(|s| s.label()).collect();
                unknown_value("season", s, &accepted)
            })
    }
}

/// Spending bracket for the whole trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BudgetBracket {
    #[serde(rename = "$500-$1000")]
    Economy,
    #[default]
    #[serde(rename = "$1000-$2000")]
    Moderate,
    #[serde(rename = "$2000-$5000")]
    Premium,
    #[serde(rename = "Luxury")]
    Luxury,
}

impl BudgetBracket {
    pub const ALL: [BudgetBracket; 4] = [
        BudgetBracket::Economy,
        BudgetBracket::Moderate,
        BudgetBracket::Premium,
        BudgetBracket::Luxury,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BudgetBracket::Economy => "$500-$1000",
            BudgetBracket::Moderate => "$1000-$2000",
            BudgetBracket::Premium => "$2000-$5000",
            BudgetBracket::Luxury => "Luxury",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            BudgetBracket::Economy => "economy",
            BudgetBracket::Moderate => "moderate",
            BudgetBracket::Premium => "premium",
            BudgetBracket::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BudgetBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BudgetBracket {
    type Err = TripError;

    /// Accepts the display label (`$1000-$2000`), the bare range
    /// (`1000-2000`) or the bracket name (`moderate`).
    fn from_str(s: &str) -> Result<Self> {
        let token = normalize_token(s);
        BudgetBracket::ALL
            .into_iter()
            .find(|b| normalize_token(b.label()) == token || b.alias() == token)
            .ok_or_else(|| {
                let accepted: Vec<&str> = BudgetBracket::ALL.iter().map(|b| b.label()).collect();
                unknown_value("budget bracket", s, &accepted)
            })
    }
}

/// Everything the crew needs to know about the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInputs {
    pub travel_type: TravelType,
    pub interests: BTreeSet<Interest>,
    pub season: Season,
    /// Trip length in days, within `[MIN_DURATION_DAYS, MAX_DURATION_DAYS]`.
    pub duration: u8,
    pub budget: BudgetBracket,
    /// Destination the research, itinerary and budget tasks focus on.
    pub city: String,
}

impl TripInputs {
    /// Inputs for `city` with every other preference at its default.
    pub fn for_city(city: &str) -> Self {
        TripInputs {
            travel_type: TravelType::default(),
            interests: BTreeSet::new(),
            season: Season::default(),
            duration: DEFAULT_DURATION_DAYS,
            budget: BudgetBracket::default(),
            city: city.to_string(),
        }
    }

    /// Reject inputs the per-city tasks cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&self.duration) {
            return Err(TripError::InvalidInput(format!(
                "duration must be between {MIN_DURATION_DAYS} and {MAX_DURATION_DAYS} days, got {}",
                self.duration
            )));
        }
        if self.city.trim().is_empty() {
            return Err(TripError::InvalidInput(
                "city must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Comma-separated interest labels, or `none specified`.
    pub fn interests_label(&self) -> String {
        if self.interests.is_empty() {
            return "none specified".to_string();
        }
        self.interests
            .iter()
            .map(|i| i.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
