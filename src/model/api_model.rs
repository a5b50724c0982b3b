//! Request and response bodies of the HTTP surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct StopTimeView {
    pub arrival_time: Option<String>,
    pub stop_sequence: i64,
    pub stop_name: String,
}

#[derive(Debug, Serialize)]
pub struct JourneyView {
    pub journey_code: String,
    pub stop_times: Vec<StopTimeView>,
}

#[derive(Debug, Serialize)]
pub struct RouteView {
    pub id: i64,
    pub route_name: String,
    pub journeys: Vec<JourneyView>,
}

/// Serializes as the 3-element array
/// `[{route_name}, {stops: [...]}, {journeys: {...}}]`.
#[derive(Debug, Serialize)]
pub struct TimetableResponse(
    pub TimetableRouteName,
    pub TimetableStops,
    pub TimetableJourneys,
);

#[derive(Debug, Serialize)]
pub struct TimetableRouteName {
    pub route_name: String,
}

#[derive(Debug, Serialize)]
pub struct TimetableStops {
    pub stops: Vec<String>,
}

/// Keyed by journey code; `BTreeMap` keeps codes in ascending order on the
/// wire. Cells are `HH:MM` or the no-service sentinel `-`.
#[derive(Debug, Serialize)]
pub struct TimetableJourneys {
    pub journeys: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyStop {
    pub stop_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct NearbyStopsResponse {
    pub nearby_stops: Vec<NearbyStop>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub gdpr_consent: bool,
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub username: String,
}
