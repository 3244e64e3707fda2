//! Error types and handling for the `PlanMyDay` workflow

use std::time::Duration;

use thiserror::Error;

use crate::state::Step;

/// Bootstrap-level error type (configuration and parsing of user-supplied values)
#[derive(Error, Debug)]
pub enum PlanMyDayError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl PlanMyDayError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlanMyDayError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            PlanMyDayError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

/// Failures while turning user input or sensor readings into a `Location`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The provider answered but had no candidate for the query
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// The provider call itself failed (network, timeout, bad response)
    #[error("Location lookup failed: {message}")]
    ResolutionFailed { message: String },

    /// The host cannot (or may not) supply a position reading
    #[error("Location sensing unavailable: {reason}")]
    CapabilityUnavailable { reason: String },
}

impl LocationError {
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    pub fn resolution_failed<S: Into<String>>(message: S) -> Self {
        Self::ResolutionFailed {
            message: message.into(),
        }
    }

    pub fn capability_unavailable<S: Into<String>>(reason: S) -> Self {
        Self::CapabilityUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether this failure is swallowed instead of shown to the user.
    ///
    /// Missing location sensing is not an error from the user's point of view:
    /// the manual search is still available.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, LocationError::CapabilityUnavailable { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocationError::NotFound { .. } => {
                "Location not found. Please try a different search.".to_string()
            }
            LocationError::ResolutionFailed { .. } => {
                "Failed to search location. Please try again.".to_string()
            }
            LocationError::CapabilityUnavailable { .. } => {
                "Location sensing is not available.".to_string()
            }
        }
    }
}

/// Failures while exchanging a plan request with the planning backend.
///
/// Every variant maps to the same user-facing message; the variants only exist
/// so logs can tell them apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Planner unreachable: {message}")]
    Transport { message: String },

    #[error("Planner rejected the request with status {status}")]
    Status { status: u16 },

    #[error("Planner returned an unreadable plan: {message}")]
    MalformedBody { message: String },

    #[error("Planner did not answer within {0:?}")]
    Timeout(Duration),
}

impl SubmitError {
    /// Short, stable label for log fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Transport { .. } => "transport",
            SubmitError::Status { .. } => "status",
            SubmitError::MalformedBody { .. } => "malformed_body",
            SubmitError::Timeout(_) => "timeout",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        "Failed to generate day plan. Please try again.".to_string()
    }
}

/// A workflow action was attempted while its guard does not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot go from {from} to {to}")]
    InvalidStep { from: Step, to: Step },

    #[error("A location with coordinates is required before continuing")]
    LocationMissing,

    #[error("The plan request needs a resolved location and at least one interest")]
    NotSubmittable,

    #[error("A plan is already being generated")]
    SubmissionInFlight,

    #[error("The location can only be changed on the location step (currently on {step})")]
    LocationLocked { step: Step },
}
