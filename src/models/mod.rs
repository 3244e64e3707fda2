//! Data models for the PlanMyDay workflow
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and display address
//! - Request: the user's selections sent to the planner
//! - Plan: the itinerary the planner sends back

pub mod location;
pub mod plan;
pub mod request;

// Re-export all public types for convenient access
pub use location::{CURRENT_LOCATION, Coordinates, Location};
pub use plan::{DayPlan, ItineraryItem, PlanWeather, Venue};
pub use request::{
    Interest, MAX_BUDGET, MAX_GROUP_SIZE, MIN_BUDGET, MIN_GROUP_SIZE, PlanRequest, TripDuration,
};
