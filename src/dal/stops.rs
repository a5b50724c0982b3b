use anyhow::Error;
use sqlx::{Pool, Sqlite, query, query_as};

use crate::model::db_model::StopDb;

/// Half-width of the proximity lookup bounding box, in degrees.
pub const NEARBY_BOX_DEGREES: f64 = 0.01;

/// Find a stop by its unique name, inserting it first if it does not exist.
/// New stops start without coordinates.
pub async fn get_or_create_stop(stop_name: &str, pool: &Pool<Sqlite>) -> Result<StopDb, Error> {
    if let Some(stop) = query_as::<_, StopDb>(
        "SELECT id, stop_name, latitude, longitude FROM stops WHERE stop_name = ?",
    )
    .bind(stop_name)
    .fetch_optional(pool)
    .await?
    {
        return Ok(stop);
    }

    let stop = query_as::<_, StopDb>(
        "INSERT INTO stops (stop_name) VALUES (?) RETURNING id, stop_name, latitude, longitude",
    )
    .bind(stop_name)
    .fetch_one(pool)
    .await?;

    Ok(stop)
}

/// Attach coordinates to an existing stop. Returns false when no stop with
/// that name exists.
pub async fn set_stop_location(
    stop_name: &str,
    latitude: f64,
    longitude: f64,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let result = query("UPDATE stops SET latitude = ?, longitude = ? WHERE stop_name = ?")
        .bind(latitude)
        .bind(longitude)
        .bind(stop_name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Stops whose stored coordinates fall inside the fixed box around the query
/// point. Stops without coordinates never match (NULL fails BETWEEN).
pub async fn get_stops_within_box(
    latitude: f64,
    longitude: f64,
    pool: &Pool<Sqlite>,
) -> Result<Vec<StopDb>, Error> {
    let stops = query_as::<_, StopDb>(
        "SELECT id, stop_name, latitude, longitude FROM stops
         WHERE latitude BETWEEN ? AND ?
           AND longitude BETWEEN ? AND ?
         ORDER BY stop_name",
    )
    .bind(latitude - NEARBY_BOX_DEGREES)
    .bind(latitude + NEARBY_BOX_DEGREES)
    .bind(longitude - NEARBY_BOX_DEGREES)
    .bind(longitude + NEARBY_BOX_DEGREES)
    .fetch_all(pool)
    .await?;

    Ok(stops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn box_lookup_excludes_far_and_ungeocoded_stops(pool: SqlitePool) {
        for (name, coords) in [
            ("Near Stop", Some((1.005, 0.995))),
            ("Edge Stop", Some((1.01, 1.01))),
            ("Far Stop", Some((1.5, 1.0))),
            ("Unmapped Stop", None),
        ] {
            get_or_create_stop(name, &pool).await.unwrap();
            if let Some((lat, lng)) = coords {
                assert!(set_stop_location(name, lat, lng, &pool).await.unwrap());
            }
        }

        let found = get_stops_within_box(1.0, 1.0, &pool).await.unwrap();
        let names = found.iter().map(|s| s.stop_name.as_str()).collect_vec();

        assert_eq!(names, vec!["Edge Stop", "Near Stop"]);
    }

    #[sqlx::test]
    async fn set_location_on_unknown_stop_reports_false(pool: SqlitePool) {
        assert!(!set_stop_location("Nowhere", 0.0, 0.0, &pool).await.unwrap());
    }
}
