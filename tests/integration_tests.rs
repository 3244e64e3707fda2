//! Integration tests for the PlanMyDay HTTP clients and workflow
//!
//! Each test runs its own axum server on an ephemeral port standing in for
//! the geocoding provider and the planning backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use planmyday::config::{GeocodingConfig, PlannerConfig};
use planmyday::models::CURRENT_LOCATION;
use planmyday::{
    Coordinates, GeocodingProvider, Interest, LocationError, LocationResolver, LookupOutcome,
    OpenWeatherGeocoder, PlanMyDayConfig, PlanSubmitter, PlanningBackend, Step, SubmissionOutcome,
    SubmitError, Workflow,
};

const API_KEY: &str = "test_api_key_123";

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// --- geocoding provider stand-in ---

async fn direct(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(params.get("appid").map(String::as_str), Some(API_KEY));
    assert_eq!(params.get("limit").map(String::as_str), Some("1"));

    match params.get("q").map(String::as_str) {
        Some("Paris") => Json(json!([
            {"name": "Paris", "local_names": {"fr": "Paris"}, "lat": 48.8566, "lon": 2.3522, "country": "FR", "state": "Ile-de-France"}
        ])),
        Some("San José") => Json(json!([
            {"name": "San José", "lat": 9.9281, "lon": -84.0907, "country": "CR"}
        ])),
        _ => Json(json!([])),
    }
}

async fn reverse(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("lat").map(String::as_str) == Some("40") {
        // the slow region
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    Json(json!([
        {"name": "Hoboken", "lat": 40.74, "lon": -74.03, "country": "US"}
    ]))
}

async fn broken_provider() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

fn geocoding_config(base_url: String) -> GeocodingConfig {
    GeocodingConfig {
        api_key: Some(API_KEY.to_string()),
        base_url,
        timeout_seconds: 1,
        max_retries: 0,
    }
}

async fn geocoder() -> OpenWeatherGeocoder {
    let base_url = spawn(
        Router::new()
            .route("/geo/1.0/direct", get(direct))
            .route("/geo/1.0/reverse", get(reverse)),
    )
    .await;
    OpenWeatherGeocoder::new(&geocoding_config(base_url)).unwrap()
}

// --- planning backend stand-in ---

type Captured = Arc<Mutex<Vec<Value>>>;

fn plan_body(request: &Value) -> Value {
    json!({
        "id": "plan-1",
        "date": "2026-10-19",
        "location": request["location"],
        "weather": {"temperature": 18.4, "feels_like": 17.0, "description": "light rain", "humidity": 80},
        "total_budget": request["budget"],
        "estimated_cost": 85.5,
        "itinerary": [
            {"venue": {"id": "v1", "name": "Louvre", "category": "museum"}, "start_time": "09:00", "end_time": "11:30", "travel_time_to_next": 15},
            {"venue": {"id": "v2", "name": "Cafe de Flore", "category": "restaurant"}, "start_time": "11:45", "end_time": "12:45", "travel_time_to_next": 20},
            {"venue": {"id": "v3", "name": "Notre-Dame", "category": "landmark"}, "start_time": "13:05", "end_time": "14:00"}
        ],
        "created_at": "2026-10-19T08:00:00Z"
    })
}

async fn plan(State(captured): State<Captured>, Json(request): Json<Value>) -> Json<Value> {
    let body = plan_body(&request);
    captured.lock().unwrap().push(request);
    Json(body)
}

async fn failing_plan() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

async fn garbled_plan() -> impl IntoResponse {
    (StatusCode::OK, "<html>not a plan</html>")
}

async fn slow_plan() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({}))
}

async fn planner(captured: Captured) -> String {
    spawn(
        Router::new()
            .route("/api/plan", post(plan))
            .with_state(captured),
    )
    .await
}

fn planner_config(base_url: String) -> PlannerConfig {
    PlannerConfig {
        base_url,
        timeout_seconds: 1,
    }
}

async fn workflow(planner_url: String, sensed: Option<(f64, f64)>) -> Workflow {
    let geocoder_url = spawn(
        Router::new()
            .route("/geo/1.0/direct", get(direct))
            .route("/geo/1.0/reverse", get(reverse)),
    )
    .await;

    let mut config = PlanMyDayConfig::default();
    config.geocoding = geocoding_config(geocoder_url);
    config.planner = planner_config(planner_url);
    config.sensing.latitude = sensed.map(|(lat, _)| lat);
    config.sensing.longitude = sensed.map(|(_, lon)| lon);
    config.validate().unwrap();

    Workflow::from_config(&config).unwrap()
}

async fn ready_for_submission(workflow: &Workflow) {
    assert_eq!(workflow.search_location("Paris").await.unwrap(), LookupOutcome::Applied);
    workflow.continue_to_preferences().unwrap();
    workflow.toggle_interest(Interest::History);
    workflow.toggle_interest(Interest::FoodAndDining);
}

// --- geocoding ---

#[tokio::test]
async fn test_forward_geocoding_resolves_paris() {
    let resolver = LocationResolver::new(Arc::new(geocoder().await));

    let location = resolver.resolve_from_query("Paris").await.unwrap();
    assert_eq!(location.latitude(), Some(48.8566));
    assert_eq!(location.longitude(), Some(2.3522));
    assert_eq!(location.display_address(), "Paris, FR");
}

#[tokio::test]
async fn test_forward_geocoding_encodes_query() {
    let geocoder = geocoder().await;
    let candidates = geocoder.geocode("San José").await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].display_address(), "San José, CR");
}

#[tokio::test]
async fn test_unknown_place_is_not_found() {
    let resolver = LocationResolver::new(Arc::new(geocoder().await));
    let err = resolver.resolve_from_query("Atlantis").await.unwrap_err();
    assert_eq!(err, LocationError::not_found("Atlantis"));
}

#[tokio::test]
async fn test_provider_outage_is_resolution_failure() {
    let base_url = spawn(Router::new().route("/geo/1.0/direct", get(broken_provider))).await;
    let geocoder = OpenWeatherGeocoder::new(&geocoding_config(base_url)).unwrap();
    let resolver = LocationResolver::new(Arc::new(geocoder));

    let err = resolver.resolve_from_query("Paris").await.unwrap_err();
    assert!(matches!(err, LocationError::ResolutionFailed { .. }));
    assert_eq!(
        err.user_message(),
        "Failed to search location. Please try again."
    );
}

#[tokio::test]
async fn test_reverse_geocoding_names_coordinates() {
    let resolver = LocationResolver::new(Arc::new(geocoder().await));
    let location = resolver
        .resolve_from_coordinates(Coordinates::new(40.7, -74.0))
        .await;
    assert_eq!(location.display_address(), "Hoboken, US");
    assert_eq!(location.latitude(), Some(40.7));
}

#[tokio::test]
async fn test_reverse_geocoding_timeout_falls_back() {
    let resolver = LocationResolver::new(Arc::new(geocoder().await));
    let location = resolver
        .resolve_from_coordinates(Coordinates::new(40.0, -74.0))
        .await;
    assert_eq!(location.latitude(), Some(40.0));
    assert_eq!(location.longitude(), Some(-74.0));
    assert_eq!(location.display_address(), CURRENT_LOCATION);
}

// --- planner ---

#[tokio::test]
async fn test_submission_wire_format() {
    let captured = Captured::default();
    let workflow = workflow(planner(captured.clone()).await, None).await;
    ready_for_submission(&workflow).await;
    workflow.set_budget(150);
    workflow.set_group_size(2);

    assert_eq!(
        workflow.generate_plan().await,
        Ok(SubmissionOutcome::Planned)
    );

    let sent = captured.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({
            "location": {"lat": 48.8566, "lng": 2.3522, "address": "Paris, FR"},
            "budget": 150,
            "interests": ["Food & Dining", "History"],
            "duration": "full-day",
            "groupSize": 2
        })]
    );
}

#[tokio::test]
async fn test_successful_plan_keeps_itinerary_order() {
    let workflow = workflow(planner(Captured::default()).await, None).await;
    ready_for_submission(&workflow).await;

    workflow.generate_plan().await.unwrap();

    let state = workflow.state();
    assert_eq!(state.step(), Step::Results);
    assert!(!state.is_submitting());
    let plan = state.day_plan().unwrap();
    let venues: Vec<_> = plan
        .itinerary
        .iter()
        .map(|item| item.venue.name.as_str())
        .collect();
    assert_eq!(venues, ["Louvre", "Cafe de Flore", "Notre-Dame"]);
    assert_eq!(plan.itinerary[0].duration_minutes(), Some(150));
    assert_eq!(plan.itinerary[2].travel_time_to_next, 0);
    assert_eq!(plan.weather.format_temperature(), "18°C");
    assert_eq!(
        plan.location.as_ref().map(|l| l.display_address()),
        Some("Paris, FR")
    );
}

#[tokio::test]
async fn test_backend_error_keeps_preferences() {
    let planner_url = spawn(Router::new().route("/api/plan", post(failing_plan))).await;
    let workflow = workflow(planner_url, None).await;
    ready_for_submission(&workflow).await;
    workflow.set_budget(300);
    let before = workflow.state().request().clone();

    let outcome = workflow.generate_plan().await.unwrap();
    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmitError::Status { status: 500 })
    );

    let state = workflow.state();
    assert_eq!(state.step(), Step::Preferences);
    assert!(!state.is_submitting());
    assert!(state.day_plan().is_none());
    assert_eq!(state.request(), &before);
    assert_eq!(
        state.last_error(),
        Some("Failed to generate day plan. Please try again.")
    );

    workflow.dismiss_error();
    assert!(workflow.state().last_error().is_none());
}

#[tokio::test]
async fn test_malformed_plan_body() {
    let planner_url = spawn(Router::new().route("/api/plan", post(garbled_plan))).await;
    let workflow = workflow(planner_url, None).await;
    ready_for_submission(&workflow).await;

    let outcome = workflow.generate_plan().await.unwrap();
    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(SubmitError::MalformedBody { .. })
    ));
    assert_eq!(workflow.state().step(), Step::Preferences);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let planner_url = spawn(Router::new().route("/api/plan", post(slow_plan))).await;
    let workflow = workflow(planner_url, None).await;
    ready_for_submission(&workflow).await;

    let outcome = workflow.generate_plan().await.unwrap();
    assert!(matches!(
        outcome,
        SubmissionOutcome::Failed(SubmitError::Timeout(_))
    ));
    let state = workflow.state();
    assert!(!state.is_submitting());
    assert!(state.last_error().is_some());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // bind and drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let submitter = PlanSubmitter::new(&planner_config(format!("http://{addr}"))).unwrap();
    let workflow = workflow(planner(Captured::default()).await, None).await;
    ready_for_submission(&workflow).await;
    let request = workflow
        .state()
        .request()
        .snapshot()
        .unwrap();

    let err = submitter.submit(&request).await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

// --- whole session ---

#[tokio::test]
async fn test_session_from_sensed_position() {
    let workflow = workflow(planner(Captured::default()).await, Some((40.7, -74.0))).await;

    assert_eq!(workflow.start().await, LookupOutcome::Applied);
    assert_eq!(
        workflow.state().location().display_address(),
        "Hoboken, US"
    );

    workflow.continue_to_preferences().unwrap();
    workflow.toggle_interest(Interest::Nature);
    workflow.generate_plan().await.unwrap();
    assert_eq!(workflow.state().step(), Step::Results);

    workflow.create_new_plan().unwrap();
    let state = workflow.state();
    assert_eq!(state.step(), Step::Preferences);
    assert!(state.request().is_selected(Interest::Nature));
    assert_eq!(state.location().display_address(), "Hoboken, US");
}

#[tokio::test]
async fn test_manual_search_supersedes_slow_sensed_lookup() {
    // (40, -74) reverse-geocodes slowly and then times out
    let workflow = workflow(planner(Captured::default()).await, Some((40.0, -74.0))).await;

    let (automatic, manual) = tokio::join!(workflow.start(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        workflow.search_location("Paris").await.unwrap()
    });

    assert_eq!(manual, LookupOutcome::Applied);
    assert_eq!(automatic, LookupOutcome::Superseded);
    assert_eq!(
        workflow.state().location().display_address(),
        "Paris, FR"
    );
}
