//! Read-only timetable endpoints: nested route/journey/stop-time listings,
//! the per-route timetable grid, and the fixed-box proximity lookup.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use chrono::NaiveTime;
use itertools::Itertools;
use sqlx::{Pool, Sqlite};

use crate::api::error::ApiError;
use crate::dal;
use crate::model::api_model::{
    JourneyView, LocationRequest, NearbyStop, NearbyStopsResponse, RouteView, StopTimeView,
    TimetableJourneys, TimetableResponse, TimetableRouteName, TimetableStops,
};
use crate::model::db_model::{JourneyDb, RouteDb, StopTimeRow};

fn format_arrival(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format("%H:%M").to_string())
}

fn stop_time_view(row: StopTimeRow) -> StopTimeView {
    StopTimeView {
        arrival_time: format_arrival(row.arrival_time),
        stop_sequence: row.stop_sequence,
        stop_name: row.stop_name,
    }
}

async fn journey_view(journey: JourneyDb, pool: &Pool<Sqlite>) -> Result<JourneyView, ApiError> {
    let stop_times = dal::get_stop_times_for_journey(journey.id, pool)
        .await?
        .into_iter()
        .map(stop_time_view)
        .collect_vec();

    Ok(JourneyView {
        journey_code: journey.journey_code,
        stop_times,
    })
}

async fn route_view(route: RouteDb, pool: &Pool<Sqlite>) -> Result<RouteView, ApiError> {
    let mut journeys = Vec::new();
    for journey in dal::get_journeys_for_route(route.id, pool).await? {
        journeys.push(journey_view(journey, pool).await?);
    }

    Ok(RouteView {
        id: route.id,
        route_name: route.route_name,
        journeys,
    })
}

pub async fn list_routes(
    State(pool): State<Pool<Sqlite>>,
) -> Result<Json<Vec<RouteView>>, ApiError> {
    let mut views = Vec::new();
    for route in dal::get_routes(&pool).await? {
        views.push(route_view(route, &pool).await?);
    }

    Ok(Json(views))
}

pub async fn get_route(
    State(pool): State<Pool<Sqlite>>,
    Path(id): Path<i64>,
) -> Result<Json<RouteView>, ApiError> {
    let route = dal::get_route(id, &pool)
        .await?
        .ok_or(ApiError::NotFound("Route"))?;

    Ok(Json(route_view(route, &pool).await?))
}

pub async fn list_journeys(
    State(pool): State<Pool<Sqlite>>,
) -> Result<Json<Vec<JourneyView>>, ApiError> {
    let mut views = Vec::new();
    for journey in dal::get_journeys(&pool).await? {
        views.push(journey_view(journey, &pool).await?);
    }

    Ok(Json(views))
}

pub async fn get_journey(
    State(pool): State<Pool<Sqlite>>,
    Path(id): Path<i64>,
) -> Result<Json<JourneyView>, ApiError> {
    let journey = dal::get_journey(id, &pool)
        .await?
        .ok_or(ApiError::NotFound("Journey"))?;

    Ok(Json(journey_view(journey, &pool).await?))
}

pub async fn list_stop_times(
    State(pool): State<Pool<Sqlite>>,
) -> Result<Json<Vec<StopTimeView>>, ApiError> {
    let views = dal::get_stop_times(&pool)
        .await?
        .into_iter()
        .map(stop_time_view)
        .collect_vec();

    Ok(Json(views))
}

pub async fn get_stop_time(
    State(pool): State<Pool<Sqlite>>,
    Path(id): Path<i64>,
) -> Result<Json<StopTimeView>, ApiError> {
    let stop_time = dal::get_stop_time(id, &pool)
        .await?
        .ok_or(ApiError::NotFound("Stop time"))?;

    Ok(Json(stop_time_view(stop_time)))
}

/// Reconstructs the imported grid for one route: stop names in sequence
/// order, then per journey (code ascending) a stop-name -> time map with `-`
/// standing in for no service.
pub async fn route_timetable(
    State(pool): State<Pool<Sqlite>>,
    Path(id): Path<i64>,
) -> Result<Json<TimetableResponse>, ApiError> {
    let route = dal::get_route(id, &pool)
        .await?
        .ok_or(ApiError::NotFound("Route"))?;

    let stops = dal::get_route_stop_names(route.id, &pool).await?;

    let mut journeys = BTreeMap::new();
    for journey in dal::get_journeys_for_route(route.id, &pool).await? {
        let mut times = BTreeMap::new();
        for stop_time in dal::get_stop_times_for_journey(journey.id, &pool).await? {
            let cell = format_arrival(stop_time.arrival_time).unwrap_or_else(|| "-".to_string());
            times.insert(stop_time.stop_name, cell);
        }
        journeys.insert(journey.journey_code, times);
    }

    Ok(Json(TimetableResponse(
        TimetableRouteName {
            route_name: route.route_name,
        },
        TimetableStops { stops },
        TimetableJourneys { journeys },
    )))
}

pub async fn nearby_stops(
    State(pool): State<Pool<Sqlite>>,
    Json(body): Json<LocationRequest>,
) -> Result<Json<NearbyStopsResponse>, ApiError> {
    let (Some(latitude), Some(longitude)) = (body.latitude, body.longitude) else {
        return Err(ApiError::BadRequest(
            "latitude and longitude are required".to_string(),
        ));
    };

    let nearby_stops = dal::get_stops_within_box(latitude, longitude, &pool)
        .await?
        .into_iter()
        .filter_map(|stop| match (stop.latitude, stop.longitude) {
            (Some(latitude), Some(longitude)) => Some(NearbyStop {
                stop_name: stop.stop_name,
                latitude,
                longitude,
            }),
            _ => None,
        })
        .collect_vec();

    Ok(Json(NearbyStopsResponse { nearby_stops }))
}
