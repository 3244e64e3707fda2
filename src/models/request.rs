//! Plan request model: what the user asks the planner for

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Location;
use crate::error::PlanMyDayError;

/// Smallest budget the planner accepts, in dollars
pub const MIN_BUDGET: u32 = 50;
/// Largest budget the planner accepts, in dollars
pub const MAX_BUDGET: u32 = 500;
/// Smallest group
pub const MIN_GROUP_SIZE: u8 = 1;
/// Largest group
pub const MAX_GROUP_SIZE: u8 = 10;

/// How much of the day the plan should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TripDuration {
    #[serde(rename = "half-day")]
    HalfDay,
    #[default]
    #[serde(rename = "full-day")]
    FullDay,
}

impl TripDuration {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TripDuration::HalfDay => "half-day",
            TripDuration::FullDay => "full-day",
        }
    }

    /// Rough length of the outing, for labels
    #[must_use]
    pub fn hours_hint(&self) -> &'static str {
        match self {
            TripDuration::HalfDay => "4-6 hours",
            TripDuration::FullDay => "8-12 hours",
        }
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripDuration {
    type Err = PlanMyDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "half-day" => Ok(TripDuration::HalfDay),
            "full-day" => Ok(TripDuration::FullDay),
            other => Err(PlanMyDayError::validation(format!(
                "Unknown duration '{other}'. Must be one of: half-day, full-day"
            ))),
        }
    }
}

/// The fixed catalog of interest categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interest {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Museums & Culture")]
    MuseumsAndCulture,
    #[serde(rename = "Outdoor Activities")]
    OutdoorActivities,
    Shopping,
    Entertainment,
    History,
    Art,
    Music,
    Sports,
    Nature,
    Architecture,
    Photography,
    #[serde(rename = "Local Experiences")]
    LocalExperiences,
}

impl Interest {
    /// Every category, in display order
    pub const ALL: [Interest; 13] = [
        Interest::FoodAndDining,
        Interest::MuseumsAndCulture,
        Interest::OutdoorActivities,
        Interest::Shopping,
        Interest::Entertainment,
        Interest::History,
        Interest::Art,
        Interest::Music,
        Interest::Sports,
        Interest::Nature,
        Interest::Architecture,
        Interest::Photography,
        Interest::LocalExperiences,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Interest::FoodAndDining => "Food & Dining",
            Interest::MuseumsAndCulture => "Museums & Culture",
            Interest::OutdoorActivities => "Outdoor Activities",
            Interest::Shopping => "Shopping",
            Interest::Entertainment => "Entertainment",
            Interest::History => "History",
            Interest::Art => "Art",
            Interest::Music => "Music",
            Interest::Sports => "Sports",
            Interest::Nature => "Nature",
            Interest::Architecture => "Architecture",
            Interest::Photography => "Photography",
            Interest::LocalExperiences => "Local Experiences",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interest {
    type Err = PlanMyDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Interest::ALL
            .into_iter()
            .find(|interest| interest.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PlanMyDayError::validation(format!("Unknown interest '{wanted}'")))
    }
}

/// Immutable snapshot of the user's selections, taken at submission time.
///
/// Only `PlanRequestBuilder::snapshot` creates one, so the location always has
/// coordinates and at least one interest is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    location: Location,
    budget: u32,
    interests: BTreeSet<Interest>,
    duration: TripDuration,
    group_size: u8,
}

impl PlanRequest {
    pub(crate) fn new(
        location: Location,
        budget: u32,
        interests: BTreeSet<Interest>,
        duration: TripDuration,
        group_size: u8,
    ) -> Self {
        Self {
            location,
            budget,
            interests,
            duration,
            group_size,
        }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn interests(&self) -> &BTreeSet<Interest> {
        &self.interests
    }

    #[must_use]
    pub fn duration(&self) -> TripDuration {
        self.duration
    }

    #[must_use]
    pub fn group_size(&self) -> u8 {
        self.group_size
    }
}
