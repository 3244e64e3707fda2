//! Async driver for one planning session
//!
//! `Workflow` owns the `WorkflowState` and the collaborators. Each user action
//! is one method: it registers the operation with the state, performs the
//! network exchange without holding the lock, then hands the outcome back.
//! Actions may therefore overlap (the automatic location lookup with a manual
//! search, for instance); lookup tokens and the in-flight flag decide which
//! results count.
//!
//! The lock is never held across an `.await`, so a plain `std` mutex is enough
//! and can also be taken from `Drop` when the host cancels an action.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::builder::PlanRequestBuilder;
use crate::config::PlanMyDayConfig;
use crate::error::{SubmitError, TransitionError};
use crate::geocoding::OpenWeatherGeocoder;
use crate::location_resolver::{LocationInput, LocationResolver};
use crate::models::{Interest, TripDuration};
use crate::sensing::{self, LocationSensor};
use crate::state::{LookupOutcome, SubmissionOutcome, WorkflowState};
use crate::submitter::{PlanSubmitter, PlanningBackend};

fn lock(state: &Mutex<WorkflowState>) -> MutexGuard<'_, WorkflowState> {
    // every mutation is a single method call, so a panic cannot leave it half-done
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag if `generate_plan` is dropped before the
/// backend answers
struct SubmissionGuard<'a> {
    state: &'a Mutex<WorkflowState>,
    armed: bool,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).abort_submission();
        }
    }
}

pub struct Workflow {
    state: Mutex<WorkflowState>,
    resolver: LocationResolver,
    backend: Arc<dyn PlanningBackend>,
    sensor: Arc<dyn LocationSensor>,
    submit_timeout: Duration,
}

impl Workflow {
    pub fn new(
        resolver: LocationResolver,
        backend: Arc<dyn PlanningBackend>,
        sensor: Arc<dyn LocationSensor>,
        request: PlanRequestBuilder,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(WorkflowState::new(request)),
            resolver,
            backend,
            sensor,
            submit_timeout,
        }
    }

    /// Wire up the HTTP collaborators described by the configuration
    pub fn from_config(config: &PlanMyDayConfig) -> anyhow::Result<Self> {
        let geocoder = OpenWeatherGeocoder::new(&config.geocoding)
            .with_context(|| "Failed to set up geocoding client")?;
        let submitter = PlanSubmitter::new(&config.planner)
            .with_context(|| "Failed to set up planner client")?;

        Ok(Self::new(
            LocationResolver::new(Arc::new(geocoder)),
            Arc::new(submitter),
            sensing::from_config(&config.sensing),
            PlanRequestBuilder::from_defaults(&config.defaults),
            Duration::from_secs(config.planner.timeout_seconds.into()),
        ))
    }

    /// Copy of the current session state, for rendering
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        lock(&self.state).clone()
    }

    /// Automatic location lookup when the session opens.
    ///
    /// Reads the sensor once and names the position via reverse geocoding.
    /// Missing or denied sensing is ignored without an error message.
    #[instrument(skip_all)]
    pub async fn start(&self) -> LookupOutcome {
        let token = lock(&self.state).begin_location_lookup();

        let coordinates = match self.sensor.current_position().await {
            Ok(coordinates) => coordinates,
            Err(e) => return lock(&self.state).complete_location_lookup(token, Err(e)),
        };

        // skip the geocoding round trip if the user already searched
        if !lock(&self.state).is_current_lookup(token) {
            debug!("Sensed position arrived after a newer lookup, not geocoding it");
            return LookupOutcome::Superseded;
        }

        let location = self.resolver.resolve_from_coordinates(coordinates).await;
        lock(&self.state).complete_location_lookup(token, Ok(location))
    }

    /// Manual search, only from the location step
    #[instrument(skip(self))]
    pub async fn search_location(&self, input: &str) -> Result<LookupOutcome, TransitionError> {
        let token = lock(&self.state).begin_location_search()?;
        let result = self.resolver.resolve(LocationInput::parse(input)).await;
        Ok(lock(&self.state).complete_location_lookup(token, result))
    }

    pub fn continue_to_preferences(&self) -> Result<(), TransitionError> {
        lock(&self.state).advance_to_preferences()
    }

    pub fn back_to_location(&self) -> Result<(), TransitionError> {
        lock(&self.state).back_to_location()
    }

    pub fn set_budget(&self, budget: u32) {
        lock(&self.state).set_budget(budget);
    }

    pub fn set_duration(&self, duration: TripDuration) {
        lock(&self.state).set_duration(duration);
    }

    pub fn set_group_size(&self, group_size: u8) {
        lock(&self.state).set_group_size(group_size);
    }

    /// Returns whether the interest is selected afterwards
    pub fn toggle_interest(&self, interest: Interest) -> bool {
        lock(&self.state).toggle_interest(interest)
    }

    /// Submit the current request and move to the results step on success.
    ///
    /// The backend gets `submit_timeout` to answer; past that the submission
    /// fails like any other backend error. Dropping the returned future
    /// abandons the submission and leaves the session ready to submit again.
    #[instrument(skip_all)]
    pub async fn generate_plan(&self) -> Result<SubmissionOutcome, TransitionError> {
        let request = lock(&self.state).begin_submission()?;
        let mut guard = SubmissionGuard {
            state: &self.state,
            armed: true,
        };
        info!(
            "Generating plan for '{}' ({} interests)",
            request.location().display_address(),
            request.interests().len()
        );

        let result = match tokio::time::timeout(self.submit_timeout, self.backend.submit(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SubmitError::Timeout(self.submit_timeout)),
        };

        guard.armed = false;
        Ok(lock(&self.state).finish_submission(result))
    }

    /// Back to the preferences step, dropping the plan
    pub fn create_new_plan(&self) -> Result<(), TransitionError> {
        lock(&self.state).start_new_plan()
    }

    pub fn dismiss_error(&self) {
        lock(&self.state).dismiss_error();
    }
}
