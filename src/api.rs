pub mod error;
pub mod timetable;
pub mod users;

use axum::Router;
use axum::routing::{get, post};
use sqlx::{Pool, Sqlite};
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(pool: Pool<Sqlite>) -> Router {
    Router::new()
        .route("/bus-routes/", get(timetable::list_routes))
        .route("/bus-routes/{id}/", get(timetable::get_route))
        .route("/journeys/", get(timetable::list_journeys))
        .route("/journeys/{id}/", get(timetable::get_journey))
        .route("/stop-times/", get(timetable::list_stop_times))
        .route("/stop-times/{id}/", get(timetable::get_stop_time))
        .route("/route-timetable/{id}/", get(timetable::route_timetable))
        .route("/nearby-stops", post(timetable::nearby_stops))
        .route("/create-user/", post(users::create_user))
        .route("/login/", post(users::login))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal;
    use crate::importer::import_timetable_from_csv;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use std::path::Path;
    use tower::ServiceExt;

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[sqlx::test]
    async fn route_timetable_reproduces_the_imported_grid(pool: SqlitePool) {
        import_timetable_from_csv(
            &pool,
            Path::new("testdata/sample_timetable.csv"),
            "Seafront Express",
        )
        .await
        .unwrap();
        let route = dal::get_or_create_route("Seafront Express", &pool).await.unwrap();

        let app = create_router(pool);
        let (status, body) = get_json(&app, &format!("/route-timetable/{}/", route.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "route_name": "Seafront Express" },
                { "stops": ["StopA", "StopB", "StopC"] },
                { "journeys": {
                    "J1": { "StopA": "08:00", "StopB": "08:10", "StopC": "08:20" },
                    "J2": { "StopA": "-", "StopB": "09:00", "StopC": "09:15" }
                } }
            ])
        );
    }

    #[sqlx::test]
    async fn unknown_route_timetable_is_404(pool: SqlitePool) {
        let app = create_router(pool);
        let (status, body) = get_json(&app, "/route-timetable/999/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Route not found." }));
    }

    #[sqlx::test]
    async fn route_listing_nests_journeys_and_stop_times(pool: SqlitePool) {
        import_timetable_from_csv(
            &pool,
            Path::new("testdata/sample_timetable.csv"),
            "Seafront Express",
        )
        .await
        .unwrap();

        let app = create_router(pool);
        let (status, body) = get_json(&app, "/bus-routes/").await;

        assert_eq!(status, StatusCode::OK);
        let routes = body.as_array().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0]["route_name"], "Seafront Express");

        let journeys = routes[0]["journeys"].as_array().unwrap();
        assert_eq!(journeys.len(), 2);
        assert_eq!(journeys[0]["journey_code"], "J1");

        let stop_times = journeys[0]["stop_times"].as_array().unwrap();
        assert_eq!(
            stop_times[0],
            json!({ "arrival_time": "08:00", "stop_sequence": 1, "stop_name": "StopA" })
        );

        let (status, detail) = get_json(&app, "/journeys/1/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["journey_code"], "J1");

        let (status, stop_time) = get_json(&app, "/stop-times/1/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stop_time["stop_name"], "StopA");

        let (status, _) = get_json(&app, "/journeys/42/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn nearby_stops_applies_the_fixed_box(pool: SqlitePool) {
        for (name, lat, lng) in [
            ("Close Stop", 1.005, 0.995),
            ("Far Stop", 1.5, 1.0),
        ] {
            dal::get_or_create_stop(name, &pool).await.unwrap();
            dal::set_stop_location(name, lat, lng, &pool).await.unwrap();
        }

        let app = create_router(pool);
        let (status, body) =
            post_json(&app, "/nearby-stops", json!({ "latitude": 1.0, "longitude": 1.0 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "nearby_stops": [
                { "stop_name": "Close Stop", "latitude": 1.005, "longitude": 0.995 }
            ] })
        );
    }

    #[sqlx::test]
    async fn nearby_stops_requires_both_coordinates(pool: SqlitePool) {
        let app = create_router(pool);
        let (status, body) = post_json(&app, "/nearby-stops", json!({ "latitude": 1.0 })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "latitude and longitude are required");
    }

    #[sqlx::test]
    async fn registration_then_login_round_trips(pool: SqlitePool) {
        let app = create_router(pool);

        let (status, created) = post_json(
            &app,
            "/create-user/",
            json!({
                "username": "rider",
                "email": "rider@example.com",
                "password": "Valid1!pass",
                "gdpr_consent": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["username"], "rider");

        let (status, body) = post_json(
            &app,
            "/login/",
            json!({ "email": "rider@example.com", "password": "Valid1!pass" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user_id"], created["id"]);
        assert_eq!(body["username"], "rider");

        let (status, body) = post_json(
            &app,
            "/login/",
            json!({ "email": "rider@example.com", "password": "Wrong1!pass" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }

    #[sqlx::test]
    async fn weak_password_and_duplicate_email_surface_per_field(pool: SqlitePool) {
        let app = create_router(pool);

        let (status, body) = post_json(
            &app,
            "/create-user/",
            json!({
                "username": "rider",
                "email": "rider@example.com",
                "password": "short1",
                "gdpr_consent": false
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["password"].as_array().unwrap().len(), 2);

        let (status, _) = post_json(
            &app,
            "/create-user/",
            json!({
                "username": "rider",
                "email": "rider@example.com",
                "password": "Valid1!pass",
                "gdpr_consent": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(
            &app,
            "/create-user/",
            json!({
                "username": "other",
                "email": "rider@example.com",
                "password": "Valid1!pass",
                "gdpr_consent": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["email"], json!(["Email is already registered."]));
    }

    #[sqlx::test]
    async fn login_with_unknown_email_is_unauthorized(pool: SqlitePool) {
        let app = create_router(pool);

        let (status, body) = post_json(
            &app,
            "/login/",
            json!({ "email": "ghost@example.com", "password": "Valid1!pass" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }
}
