//! Location model for geographic coordinates and display address

use serde::{Deserialize, Serialize};

/// Address shown when coordinates are known but no place name could be found
pub const CURRENT_LOCATION: &str = "Current Location";

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are inside the valid WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as coordinates string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Where the day is being planned.
///
/// Either unresolved (no coordinates, empty address) or resolved (coordinates
/// plus a non-empty address). Latitude and longitude always travel together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "WireLocation", try_from = "WireLocation")]
pub struct Location {
    coordinates: Option<Coordinates>,
    display_address: String,
}

impl Location {
    /// A location that has not been resolved yet
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Create a resolved location. A blank address falls back to "Current Location".
    #[must_use]
    pub fn resolved(coordinates: Coordinates, display_address: impl Into<String>) -> Self {
        let display_address = display_address.into();
        let display_address = if display_address.trim().is_empty() {
            CURRENT_LOCATION.to_string()
        } else {
            display_address
        };
        Self {
            coordinates: Some(coordinates),
            display_address,
        }
    }

    /// Coordinates without a place name
    #[must_use]
    pub fn current(coordinates: Coordinates) -> Self {
        Self::resolved(coordinates, CURRENT_LOCATION)
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }

    #[must_use]
    pub fn display_address(&self) -> &str {
        &self.display_address
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// `{lat, lng, address}` as exchanged with the planning backend
#[derive(Debug, Serialize, Deserialize)]
struct WireLocation {
    lat: Option<f64>,
    lng: Option<f64>,
    #[serde(default)]
    address: String,
}

impl From<Location> for WireLocation {
    fn from(location: Location) -> Self {
        Self {
            lat: location.latitude(),
            lng: location.longitude(),
            address: location.display_address,
        }
    }
}

impl TryFrom<WireLocation> for Location {
    type Error = String;

    fn try_from(wire: WireLocation) -> Result<Self, Self::Error> {
        match (wire.lat, wire.lng) {
            (Some(lat), Some(lng)) => Ok(Location::resolved(Coordinates::new(lat, lng), wire.address)),
            (None, None) => Ok(Location {
                coordinates: None,
                display_address: wire.address,
            }),
            _ => Err("latitude and longitude must be given together".to_string()),
        }
    }
}
