//! Geocoding provider client for the OpenWeatherMap Geo API
//!
//! Forward geocoding turns a free-text place into ranked candidates, reverse
//! geocoding turns coordinates into ranked place names. The provider is an
//! external collaborator, so the workflow only sees the `GeocodingProvider`
//! trait; `OpenWeatherGeocoder` is the production implementation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::PlanMyDayError;
use crate::config::GeocodingConfig;
use crate::models::{Coordinates, Location};

/// Only the best-ranked candidate is ever used
const CANDIDATE_LIMIT: u8 = 1;

/// One ranked place candidate
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeocodingCandidate {
    /// Location name
    pub name: String,
    /// Local names in different languages
    #[serde(default)]
    pub local_names: Option<HashMap<String, String>>,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Country code
    #[serde(default)]
    pub country: String,
    /// State or region, when the provider knows it
    #[serde(default)]
    pub state: Option<String>,
}

impl GeocodingCandidate {
    /// `"{name}, {country}"`, or just the name when the country is unknown
    #[must_use]
    pub fn display_address(&self) -> String {
        if self.country.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

impl From<GeocodingCandidate> for Location {
    fn from(candidate: GeocodingCandidate) -> Self {
        let address = candidate.display_address();
        Location::resolved(Coordinates::new(candidate.lat, candidate.lon), address)
    }
}

/// Why a provider call produced no candidate list
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest_middleware::Error),

    #[error("Geocoding provider returned status {status}")]
    Status { status: u16 },

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// Forward and reverse geocoding, first candidate = best match
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodingCandidate>, GeocodingError>;

    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<GeocodingCandidate>, GeocodingError>;
}

/// OpenWeatherMap Geo API 1.0 client
pub struct OpenWeatherGeocoder {
    /// HTTP client with transient-failure retries
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl OpenWeatherGeocoder {
    /// Create a new geocoding client
    pub fn new(config: &GeocodingConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PlanMyDayError::config("A geocoding API key is required"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("PlanMyDay/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        debug!(
            "Geocoding response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!("Geocoding request failed with status {}", status);
            return Err(GeocodingError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<GeocodingCandidate>>()
            .await
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
        let url = format!(
            "{}/geo/1.0/direct?q={}&limit={}&appid={}",
            self.base_url,
            urlencoding::encode(query),
            CANDIDATE_LIMIT,
            urlencoding::encode(&self.api_key)
        );

        let candidates = self.fetch(&url).await?;
        if candidates.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            info!("Found {} geocoding results for '{}'", candidates.len(), query);
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
        let url = format!(
            "{}/geo/1.0/reverse?lat={}&lon={}&limit={}&appid={}",
            self.base_url,
            coordinates.latitude,
            coordinates.longitude,
            CANDIDATE_LIMIT,
            urlencoding::encode(&self.api_key)
        );

        self.fetch(&url).await
    }
}
