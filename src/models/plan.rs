//! Day plan model as returned by the planning backend
//!
//! The backend is trusted: beyond requiring `weather` and `itinerary`, nothing
//! here is validated. Everything else falls back to defaults when missing.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::Location;

/// A generated plan for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Backend-assigned plan identifier
    pub id: Option<String>,
    /// Calendar date the plan is for (YYYY-MM-DD)
    pub date: Option<String>,
    /// Location echoed back by the backend
    pub location: Option<Location>,
    /// Weather at the location when the plan was made
    pub weather: PlanWeather,
    /// Budget the user asked for
    #[serde(default)]
    pub total_budget: f64,
    /// What the backend expects the day to cost
    #[serde(default)]
    pub estimated_cost: f64,
    /// Visits in chronological order
    pub itinerary: Vec<ItineraryItem>,
    pub created_at: Option<String>,
}

impl DayPlan {
    /// Share of the budget the plan uses, in percent, capped at 100
    #[must_use]
    pub fn budget_utilization(&self) -> f64 {
        if self.total_budget <= 0.0 {
            return 0.0;
        }
        (self.estimated_cost / self.total_budget * 100.0).min(100.0)
    }

    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.estimated_cost > self.total_budget
    }
}

/// Weather summary attached to a plan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanWeather {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent temperature in Celsius
    pub feels_like: f64,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Relative humidity in percent
    pub humidity: Option<u8>,
    /// Condition group (e.g. "Rain", "Clouds")
    pub weather_main: Option<String>,
}

impl PlanWeather {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.0}°C", self.temperature)
    }
}

/// One scheduled visit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryItem {
    pub venue: Venue,
    /// Time of day, `HH:MM`
    pub start_time: String,
    /// Time of day, `HH:MM`
    pub end_time: String,
    /// Minutes of travel to the following item
    pub travel_time_to_next: u32,
    pub notes: String,
}

impl ItineraryItem {
    /// Parsed start and end, when both are `HH:MM` times
    #[must_use]
    pub fn time_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = NaiveTime::parse_from_str(self.start_time.trim(), "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(self.end_time.trim(), "%H:%M").ok()?;
        Some((start, end))
    }

    /// Length of the visit; `None` for unparseable or wrapping windows
    #[must_use]
    pub fn duration_minutes(&self) -> Option<i64> {
        let (start, end) = self.time_window()?;
        (end >= start).then(|| (end - start).num_minutes())
    }
}

/// A recommended place
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    pub id: Option<String>,
    pub name: String,
    /// restaurant, activity, event, attraction
    pub category: String,
    pub location: Option<Location>,
    /// `$` to `$$$$`
    pub price_range: String,
    pub rating: f64,
    pub description: String,
    pub popular_items: Vec<String>,
    pub opening_hours: Option<String>,
    /// Typical visit length in minutes
    pub estimated_duration: Option<u32>,
    pub booking_url: Option<String>,
}
