//! Accumulates the user's selections into a `PlanRequest`
//!
//! Mutators clamp at the point of mutation, so whatever the builder holds is
//! always a valid in-progress request. The only open conditions are a resolved
//! location and at least one interest, checked by `is_submittable`.

use std::collections::BTreeSet;

use crate::config::DefaultsConfig;
use crate::models::{
    Interest, Location, MAX_BUDGET, MAX_GROUP_SIZE, MIN_BUDGET, MIN_GROUP_SIZE, PlanRequest,
    TripDuration,
};

const DEFAULT_BUDGET: u32 = 100;
const DEFAULT_GROUP_SIZE: u8 = 1;

/// In-progress plan request
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequestBuilder {
    location: Location,
    budget: u32,
    duration: TripDuration,
    group_size: u8,
    interests: BTreeSet<Interest>,
}

impl Default for PlanRequestBuilder {
    fn default() -> Self {
        Self {
            location: Location::unresolved(),
            budget: DEFAULT_BUDGET,
            duration: TripDuration::default(),
            group_size: DEFAULT_GROUP_SIZE,
            interests: BTreeSet::new(),
        }
    }
}

impl PlanRequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from configured defaults; out-of-range values are clamped
    #[must_use]
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        let mut builder = Self::default();
        builder.set_budget(defaults.budget);
        builder.set_group_size(defaults.group_size);
        builder.set_duration(defaults.duration);
        builder
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    /// Set the budget in dollars, clamped to `[MIN_BUDGET, MAX_BUDGET]`
    pub fn set_budget(&mut self, budget: u32) {
        self.budget = budget.clamp(MIN_BUDGET, MAX_BUDGET);
    }

    pub fn set_duration(&mut self, duration: TripDuration) {
        self.duration = duration;
    }

    /// Set the group size, clamped to `[MIN_GROUP_SIZE, MAX_GROUP_SIZE]`
    pub fn set_group_size(&mut self, group_size: u8) {
        self.group_size = group_size.clamp(MIN_GROUP_SIZE, MAX_GROUP_SIZE);
    }

    /// Add the interest if absent, remove it if present.
    /// Returns whether it is selected afterwards.
    pub fn toggle_interest(&mut self, interest: Interest) -> bool {
        if self.interests.remove(&interest) {
            false
        } else {
            self.interests.insert(interest);
            true
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
    pub fn duration(&self) -> TripDuration {
        self.duration
    }

    #[must_use]
    pub fn group_size(&self) -> u8 {
        self.group_size
    }

    #[must_use]
    pub fn interests(&self) -> &BTreeSet<Interest> {
        &self.interests
    }

    #[must_use]
    pub fn is_selected(&self, interest: Interest) -> bool {
        self.interests.contains(&interest)
    }

    /// Resolved location and at least one interest
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.location.is_resolved() && !self.interests.is_empty()
    }

    /// Immutable request, or `None` while not submittable
    #[must_use]
    pub fn snapshot(&self) -> Option<PlanRequest> {
        self.is_submittable().then(|| {
            PlanRequest::new(
                self.location.clone(),
                self.budget,
                self.interests.clone(),
                self.duration,
                self.group_size,
            )
        })
    }
}
