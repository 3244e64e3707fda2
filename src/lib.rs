//! `PlanMyDay` - Guided day planning
//!
//! This library provides the core of a three-step planning flow: resolve a
//! location, capture preferences, and submit them to a planning backend for
//! a timed itinerary. Rendering is left to the host application.

pub mod builder;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod location_resolver;
pub mod models;
pub mod sensing;
pub mod state;
pub mod submitter;
pub mod telemetry;
pub mod workflow;

// Re-export core types for public API
pub use builder::PlanRequestBuilder;
pub use config::PlanMyDayConfig;
pub use error::{LocationError, PlanMyDayError, SubmitError, TransitionError};
pub use geocoding::{GeocodingProvider, OpenWeatherGeocoder};
pub use location_resolver::{LocationInput, LocationResolver};
pub use models::{Coordinates, DayPlan, Interest, Location, PlanRequest, TripDuration};
pub use sensing::{FixedLocationSensor, LocationSensor, NoLocationSensor};
pub use state::{LookupOutcome, Step, SubmissionOutcome, WorkflowState};
pub use submitter::{PlanSubmitter, PlanningBackend};
pub use workflow::Workflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
