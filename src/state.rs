//! Workflow state machine
//!
//! `WorkflowState` is the single source of truth for one planning session:
//! current step, in-progress request, last plan, last error and the loading
//! flag. It performs no I/O. The caller starts an operation here, does the
//! network exchange, and hands the outcome back.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::PlanRequestBuilder;
use crate::error::{LocationError, SubmitError, TransitionError};
use crate::models::{DayPlan, Interest, Location, PlanRequest, TripDuration};

/// Workflow steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Location,
    Preferences,
    Results,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Location, Step::Preferences, Step::Results];

    /// Zero-based position, for progress indicators
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Step::Location => 0,
            Step::Preferences => 1,
            Step::Results => 2,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Location => "location",
            Step::Preferences => "preferences",
            Step::Results => "results",
        })
    }
}

/// Identifies one location lookup. Only the most recently issued token may
/// write its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupToken(u64);

/// What happened to a finished lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The location was stored
    Applied,
    /// The lookup failed; `last_error` holds the message
    Failed(LocationError),
    /// The lookup failed in a way the user does not need to hear about
    Ignored(LocationError),
    /// A newer lookup was started after this one; nothing changed
    Superseded,
}

/// What happened to a finished submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Plan stored, now on the results step
    Planned,
    /// Still on the preferences step; `last_error` holds the message
    Failed(SubmitError),
}

#[derive(Debug, Clone)]
pub struct WorkflowState {
    step: Step,
    request: PlanRequestBuilder,
    day_plan: Option<DayPlan>,
    is_submitting: bool,
    last_error: Option<String>,
    last_lookup: u64,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(PlanRequestBuilder::default())
    }
}

impl WorkflowState {
    /// Fresh session on the location step
    #[must_use]
    pub fn new(request: PlanRequestBuilder) -> Self {
        Self {
            step: Step::Location,
            request,
            day_plan: None,
            is_submitting: false,
            last_error: None,
            last_lookup: 0,
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn request(&self) -> &PlanRequestBuilder {
        &self.request
    }

    #[must_use]
    pub fn day_plan(&self) -> Option<&DayPlan> {
        self.day_plan.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        self.request.location()
    }

    // --- location lookups ---

    /// Register a new lookup. Any lookup started earlier becomes stale.
    pub fn begin_location_lookup(&mut self) -> LookupToken {
        self.last_lookup += 1;
        LookupToken(self.last_lookup)
    }

    /// Register a user-initiated search. Only allowed on the location step,
    /// so the location cannot change under preferences or a shown plan.
    pub fn begin_location_search(&mut self) -> Result<LookupToken, TransitionError> {
        if self.step != Step::Location {
            return Err(TransitionError::LocationLocked { step: self.step });
        }
        Ok(self.begin_location_lookup())
    }

    /// Whether `token` is still the latest lookup
    #[must_use]
    pub fn is_current_lookup(&self, token: LookupToken) -> bool {
        token.0 == self.last_lookup
    }

    /// Hand back the result of a lookup started with `begin_location_lookup`.
    ///
    /// Failures never touch the stored location.
    pub fn complete_location_lookup(
        &mut self,
        token: LookupToken,
        result: Result<Location, LocationError>,
    ) -> LookupOutcome {
        if !self.is_current_lookup(token) {
            debug!(
                "Dropping result of superseded lookup {:?} (latest is {})",
                token, self.last_lookup
            );
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(location) => {
                debug!("Location set to '{}'", location.display_address());
                self.request.set_location(location);
                LookupOutcome::Applied
            }
            Err(e) if e.is_silent() => {
                debug!("Ignoring location failure: {}", e);
                LookupOutcome::Ignored(e)
            }
            Err(e) => {
                warn!("Location lookup failed: {}", e);
                self.last_error = Some(e.user_message());
                LookupOutcome::Failed(e)
            }
        }
    }

    // --- preference edits ---

    pub fn set_budget(&mut self, budget: u32) {
        self.request.set_budget(budget);
    }

    pub fn set_duration(&mut self, duration: TripDuration) {
        self.request.set_duration(duration);
    }

    pub fn set_group_size(&mut self, group_size: u8) {
        self.request.set_group_size(group_size);
    }

    pub fn toggle_interest(&mut self, interest: Interest) -> bool {
        self.request.toggle_interest(interest)
    }

    // --- step transitions ---

    /// location -> preferences, once the location has coordinates
    pub fn advance_to_preferences(&mut self) -> Result<(), TransitionError> {
        self.expect_step(Step::Location, Step::Preferences)?;
        if !self.request.location().is_resolved() {
            return Err(TransitionError::LocationMissing);
        }
        self.step = Step::Preferences;
        Ok(())
    }

    /// preferences -> location ("back"); keeps everything
    pub fn back_to_location(&mut self) -> Result<(), TransitionError> {
        self.expect_step(Step::Preferences, Step::Location)?;
        self.step = Step::Location;
        Ok(())
    }

    /// Start the preferences -> results transition.
    ///
    /// Returns the request snapshot to send. The step does not change until
    /// `finish_submission`.
    pub fn begin_submission(&mut self) -> Result<PlanRequest, TransitionError> {
        self.expect_step(Step::Preferences, Step::Results)?;
        if self.is_submitting {
            return Err(TransitionError::SubmissionInFlight);
        }
        let request = self
            .request
            .snapshot()
            .ok_or(TransitionError::NotSubmittable)?;

        self.is_submitting = true;
        self.last_error = None;
        Ok(request)
    }

    /// Record the backend's answer for the submission in flight
    pub fn finish_submission(&mut self, result: Result<DayPlan, SubmitError>) -> SubmissionOutcome {
        self.is_submitting = false;
        match result {
            Ok(plan) => {
                info!("Day plan ready with {} stops", plan.itinerary.len());
                self.day_plan = Some(plan);
                self.step = Step::Results;
                SubmissionOutcome::Planned
            }
            Err(e) => {
                warn!(kind = e.kind(), "Plan submission failed: {}", e);
                self.last_error = Some(e.user_message());
                SubmissionOutcome::Failed(e)
            }
        }
    }

    /// Give up on the submission in flight without an answer.
    ///
    /// Clears the loading flag and nothing else; the step, the request and
    /// any previous error stay as they are. Returns whether a submission was
    /// actually in flight.
    pub fn abort_submission(&mut self) -> bool {
        if !self.is_submitting {
            return false;
        }
        debug!("Submission abandoned before the planner answered");
        self.is_submitting = false;
        true
    }

    /// results -> preferences ("create new plan"); drops only the plan
    pub fn start_new_plan(&mut self) -> Result<(), TransitionError> {
        self.expect_step(Step::Results, Step::Preferences)?;
        self.day_plan = None;
        self.step = Step::Preferences;
        Ok(())
    }

    /// Clear the error message, from any step
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn expect_step(&self, from: Step, to: Step) -> Result<(), TransitionError> {
        if self.step == from {
            Ok(())
        } else {
            Err(TransitionError::InvalidStep {
                from: self.step,
                to,
            })
        }
    }
}
