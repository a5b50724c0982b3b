use chrono::{DateTime, NaiveTime, Utc};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RouteDb {
    pub id: i64,
    pub route_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StopDb {
    pub id: i64,
    pub stop_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JourneyDb {
    pub id: i64,
    pub journey_code: String,
    pub route_id: i64,
}

/// A stop time as it goes into the store. `arrival_time` of `None` means the
/// journey does not call at this stop.
#[derive(Debug, Clone)]
pub struct NewStopTime {
    pub journey_id: i64,
    pub stop_id: i64,
    pub arrival_time: Option<NaiveTime>,
    /// 1-indexed position of the stop along the route.
    pub stop_sequence: i64,
}

/// A stop time joined with its stop name, the shape every read path wants.
#[derive(Debug, Clone, FromRow)]
pub struct StopTimeRow {
    pub id: i64,
    pub arrival_time: Option<NaiveTime>,
    pub stop_sequence: i64,
    pub stop_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserDb {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub gdpr_consent: bool,
    pub created_at: DateTime<Utc>,
}
