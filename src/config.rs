//! Configuration management for `PlanMyDay`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlanMyDayError;
use crate::models::{
    Coordinates, MAX_BUDGET, MAX_GROUP_SIZE, MIN_BUDGET, MIN_GROUP_SIZE, TripDuration,
};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanMyDayConfig {
    /// Geocoding provider settings
    pub geocoding: GeocodingConfig,
    /// Planning backend settings
    pub planner: PlannerConfig,
    /// Optional fixed position used as the host's location reading
    pub sensing: SensingConfig,
    /// Starting values for a new plan request
    pub defaults: DefaultsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL of the Geo API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures
    pub max_retries: u32,
}

/// Planning backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Base URL of the planning backend
    pub base_url: String,
    /// Deadline for one plan submission in seconds
    pub timeout_seconds: u32,
}

/// Fixed position reported as the host's location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensingConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SensingConfig {
    /// Configured position, when both components are set
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// Starting values for a new plan request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Budget in dollars
    pub budget: u32,
    /// Number of people
    pub group_size: u8,
    pub duration: TripDuration,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_max_retries() -> u32 {
    2
}

fn default_planner_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_planner_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: default_geocoding_max_retries(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: default_planner_base_url(),
            timeout_seconds: default_planner_timeout(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            budget: 100,
            group_size: 1,
            duration: TripDuration::FullDay,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PlanMyDayConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. PLANMYDAY_GEOCODING__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("PLANMYDAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlanMyDayConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("planmyday").join("config.toml"))
    }

    /// Replace empty values left by partial config files
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.planner.base_url.is_empty() {
            self.planner.base_url = default_planner_base_url();
        }
        if self.planner.timeout_seconds == 0 {
            self.planner.timeout_seconds = default_planner_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_sensing()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.geocoding.api_key {
            if api_key.trim().is_empty() {
                return Err(PlanMyDayError::config(
                    "Geocoding API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(PlanMyDayError::config(
                    "Geocoding API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(PlanMyDayError::config(
                    "Geocoding API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(PlanMyDayError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.geocoding.max_retries > 10 {
            return Err(
                PlanMyDayError::config("Geocoding max retries cannot exceed 10").into(),
            );
        }

        if self.planner.timeout_seconds == 0 || self.planner.timeout_seconds > 300 {
            return Err(PlanMyDayError::config(
                "Planner timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !(MIN_BUDGET..=MAX_BUDGET).contains(&self.defaults.budget) {
            return Err(PlanMyDayError::config(format!(
                "Default budget must be between {MIN_BUDGET} and {MAX_BUDGET}"
            ))
            .into());
        }

        if !(MIN_GROUP_SIZE..=MAX_GROUP_SIZE).contains(&self.defaults.group_size) {
            return Err(PlanMyDayError::config(format!(
                "Default group size must be between {MIN_GROUP_SIZE} and {MAX_GROUP_SIZE}"
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlanMyDayError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlanMyDayError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Planner", &self.planner.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlanMyDayError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_sensing(&self) -> Result<()> {
        match (self.sensing.latitude, self.sensing.longitude) {
            (Some(_), None) | (None, Some(_)) => Err(PlanMyDayError::config(
                "Sensing latitude and longitude must be set together",
            )
            .into()),
            _ => match self.sensing.coordinates() {
                Some(coordinates) if !coordinates.is_valid() => Err(PlanMyDayError::config(
                    format!("Sensing position {} is out of range", coordinates.format()),
                )
                .into()),
                _ => Ok(()),
            },
        }
    }
}
