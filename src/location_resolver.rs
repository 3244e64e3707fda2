//! Location Resolution Module
//!
//! This module turns user input (free text or a coordinate pair) and sensor
//! readings into canonical `Location` values using a geocoding provider.

use std::sync::Arc;

use tracing::debug;

use crate::error::LocationError;
use crate::geocoding::GeocodingProvider;
use crate::models::{Coordinates, Location};

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates typed by the user
    Coordinates(Coordinates),
    /// Place name, address or postal code
    Query(String),
}

impl LocationInput {
    /// Classify search-box input.
    ///
    /// `"46.8182,8.2275"` and `"46.8182 8.2275"` become coordinates when both
    /// values are in range; anything else is a query.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match Self::parse_coordinates(input) {
            Some(coordinates) => LocationInput::Coordinates(coordinates),
            None => LocationInput::Query(input.to_string()),
        }
    }

    fn parse_coordinates(input: &str) -> Option<Coordinates> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };

        let coordinates = Coordinates::new(lat.parse().ok()?, lon.parse().ok()?);
        coordinates.is_valid().then_some(coordinates)
    }
}

/// Service for resolving location inputs
#[derive(Clone)]
pub struct LocationResolver {
    provider: Arc<dyn GeocodingProvider>,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    /// Resolve search-box input, routing coordinate pairs to reverse geocoding
    pub async fn resolve(&self, input: LocationInput) -> Result<Location, LocationError> {
        match input {
            LocationInput::Coordinates(coordinates) => {
                Ok(self.resolve_from_coordinates(coordinates).await)
            }
            LocationInput::Query(query) => self.resolve_from_query(&query).await,
        }
    }

    /// Resolve coordinates to a location with a place name via reverse geocoding.
    ///
    /// Never fails: coordinates alone are enough to plan, so provider errors and
    /// empty results fall back to "Current Location".
    pub async fn resolve_from_coordinates(&self, coordinates: Coordinates) -> Location {
        debug!("Resolving coordinates: ({})", coordinates.format());

        match self.provider.reverse_geocode(coordinates).await {
            Ok(results) => match results.into_iter().next() {
                Some(best) if !best.name.trim().is_empty() => {
                    Location::resolved(coordinates, best.display_address())
                }
                _ => {
                    debug!("No reverse geocoding results found, using current location");
                    Location::current(coordinates)
                }
            },
            Err(e) => {
                debug!("Reverse geocoding failed: {}, using current location", e);
                Location::current(coordinates)
            }
        }
    }

    /// Resolve a place name to coordinates via forward geocoding
    pub async fn resolve_from_query(&self, query: &str) -> Result<Location, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocationError::not_found(query));
        }

        debug!("Geocoding location name: {}", query);

        let results = self.provider.geocode(query).await.map_err(|e| {
            debug!("Geocoding '{}' failed: {}", query, e);
            LocationError::resolution_failed(e.to_string())
        })?;

        // Use the first (best) result
        let best = results
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::not_found(query))?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            best.name, best.lat, best.lon
        );

        Ok(Location::from(best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::{GeocodingCandidate, GeocodingError};
    use crate::models::CURRENT_LOCATION;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned provider answers
    enum Reply {
        Candidates(Vec<GeocodingCandidate>),
        Fail,
    }

    struct FakeProvider {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn answer(&self) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Candidates(c) => Ok(c.clone()),
                Reply::Fail => Err(GeocodingError::InvalidResponse("timed out".into())),
            }
        }
    }

    #[async_trait]
    impl GeocodingProvider for FakeProvider {
        async fn geocode(&self, _query: &str) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
            self.answer()
        }

        async fn reverse_geocode(
            &self,
            _coordinates: Coordinates,
        ) -> Result<Vec<GeocodingCandidate>, GeocodingError> {
            self.answer()
        }
    }

    fn candidate(name: &str, country: &str, lat: f64, lon: f64) -> GeocodingCandidate {
        GeocodingCandidate {
            name: name.to_string(),
            local_names: None,
            lat,
            lon,
            country: country.to_string(),
            state: None,
        }
    }

    #[tokio::test]
    async fn test_query_takes_first_candidate() {
        let provider = FakeProvider::new(Reply::Candidates(vec![
            candidate("Paris", "FR", 48.8566, 2.3522),
            candidate("Paris", "US", 33.6609, -95.5555),
        ]));
        let resolver = LocationResolver::new(provider);

        let location = resolver.resolve_from_query("Paris").await.unwrap();
        assert_eq!(location.latitude(), Some(48.8566));
        assert_eq!(location.longitude(), Some(2.3522));
        assert_eq!(location.display_address(), "Paris, FR");
    }

    #[tokio::test]
    async fn test_query_without_candidates_is_not_found() {
        let resolver = LocationResolver::new(FakeProvider::new(Reply::Candidates(vec![])));
        let err = resolver.resolve_from_query("Atlantis").await.unwrap_err();
        assert_eq!(err, LocationError::not_found("Atlantis"));
    }

    #[tokio::test]
    async fn test_blank_query_skips_provider() {
        let provider = FakeProvider::new(Reply::Candidates(vec![candidate("X", "Y", 1.0, 1.0)]));
        let resolver = LocationResolver::new(provider.clone());

        let err = resolver.resolve_from_query("   ").await.unwrap_err();
        assert!(matches!(err, LocationError::NotFound { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_provider_failure_is_resolution_failure() {
        let resolver = LocationResolver::new(FakeProvider::new(Reply::Fail));
        let err = resolver.resolve_from_query("Paris").await.unwrap_err();
        assert!(matches!(err, LocationError::ResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn test_reverse_geocode_names_the_place() {
        let provider = FakeProvider::new(Reply::Candidates(vec![candidate(
            "Hoboken", "US", 40.74, -74.03,
        )]));
        let resolver = LocationResolver::new(provider);

        let location = resolver
            .resolve_from_coordinates(Coordinates::new(40.0, -74.0))
            .await;
        // the sensed coordinates win over the candidate's
        assert_eq!(location.coordinates(), Some(Coordinates::new(40.0, -74.0)));
        assert_eq!(location.display_address(), "Hoboken, US");
    }

    #[rstest]
    #[case::provider_error(Reply::Fail)]
    #[case::no_candidates(Reply::Candidates(vec![]))]
    #[case::blank_name(Reply::Candidates(vec![candidate(" ", "US", 40.0, -74.0)]))]
    #[tokio::test]
    async fn test_reverse_geocode_falls_back(#[case] reply: Reply) {
        let resolver = LocationResolver::new(FakeProvider::new(reply));
        let location = resolver
            .resolve_from_coordinates(Coordinates::new(40.0, -74.0))
            .await;
        assert_eq!(location.latitude(), Some(40.0));
        assert_eq!(location.longitude(), Some(-74.0));
        assert_eq!(location.display_address(), CURRENT_LOCATION);
    }

    #[tokio::test]
    async fn test_resolve_routes_coordinates_to_reverse_geocoding() {
        let resolver = LocationResolver::new(FakeProvider::new(Reply::Fail));
        let location = resolver
            .resolve(LocationInput::parse("40.0, -74.0"))
            .await
            .unwrap();
        assert_eq!(location.display_address(), CURRENT_LOCATION);
    }

    #[rstest]
    #[case("46.8182,8.2275", LocationInput::Coordinates(Coordinates::new(46.8182, 8.2275)))]
    #[case("46.8182 8.2275", LocationInput::Coordinates(Coordinates::new(46.8182, 8.2275)))]
    #[case("-46.8182, -8.2275", LocationInput::Coordinates(Coordinates::new(-46.8182, -8.2275)))]
    #[case("91.0,8.0", LocationInput::Query("91.0,8.0".into()))]
    #[case("46.0,-181.0", LocationInput::Query("46.0,-181.0".into()))]
    #[case("46.0", LocationInput::Query("46.0".into()))]
    #[case("46.0,8.0,0.0", LocationInput::Query("46.0,8.0,0.0".into()))]
    #[case("  New York City ", LocationInput::Query("New York City".into()))]
    fn test_input_parsing(#[case] input: &str, #[case] expected: LocationInput) {
        assert_eq!(LocationInput::parse(input), expected);
    }
}
