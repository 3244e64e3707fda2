//! Host location sensing
//!
//! A one-shot position reading taken when the workflow starts. Hosts without
//! the capability (or users who deny it) simply get `CapabilityUnavailable`,
//! which the workflow swallows.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SensingConfig;
use crate::error::LocationError;
use crate::models::Coordinates;

#[async_trait]
pub trait LocationSensor: Send + Sync {
    /// Read the current position once. Never retried by the caller.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Host without location sensing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationSensor;

#[async_trait]
impl LocationSensor for NoLocationSensor {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::capability_unavailable(
            "no location sensing on this host",
        ))
    }
}

/// Reports the same position every time, e.g. a configured home location
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationSensor {
    coordinates: Coordinates,
}

impl FixedLocationSensor {
    #[must_use]
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationSensor for FixedLocationSensor {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if self.coordinates.is_valid() {
            Ok(self.coordinates)
        } else {
            Err(LocationError::capability_unavailable(format!(
                "configured position {} is out of range",
                self.coordinates.format()
            )))
        }
    }
}

/// Pick the sensor described by the configuration
#[must_use]
pub fn from_config(config: &SensingConfig) -> Arc<dyn LocationSensor> {
    match config.coordinates() {
        Some(coordinates) => Arc::new(FixedLocationSensor::new(coordinates)),
        None => Arc::new(NoLocationSensor),
    }
}
