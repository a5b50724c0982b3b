use anyhow::Error;
use itertools::Itertools;
use sqlx::{Pool, QueryBuilder, Sqlite, Transaction, query, query_as, query_scalar};
use tracing::{Instrument, info_span};

use crate::model::db_model::{NewStopTime, StopTimeRow};

pub async fn insert_stop_times(
    stop_times: &[NewStopTime],
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<(), Error> {
    let chunks = stop_times.chunks(1024).collect_vec();
    for chunk in chunks {
        let mut query_builder = QueryBuilder::new(
            "INSERT INTO stop_times (
                journey_id,
                stop_id,
                arrival_time,
                stop_sequence
            )",
        );

        query_builder.push_values(chunk, |mut b, stop_time| {
            b.push_bind(stop_time.journey_id)
                .push_bind(stop_time.stop_id)
                .push_bind(stop_time.arrival_time)
                .push_bind(stop_time.stop_sequence);
        });

        query_builder.push(" ON CONFLICT ( journey_id, stop_id ) DO NOTHING");

        query_builder
            .build()
            .execute(&mut **tx)
            .instrument(info_span!("Inserting stop times"))
            .await?;
    }

    Ok(())
}

/// Clears every stop time belonging to the route's journeys. Re-importing a
/// route replaces its grid rather than stacking duplicates.
pub async fn delete_stop_times_for_route(
    route_id: i64,
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<u64, Error> {
    let result = query(
        "DELETE FROM stop_times
         WHERE journey_id IN (SELECT id FROM journeys WHERE route_id = ?)",
    )
    .bind(route_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_stop_times(pool: &Pool<Sqlite>) -> Result<Vec<StopTimeRow>, Error> {
    let stop_times = query_as::<_, StopTimeRow>(
        "SELECT st.id, st.arrival_time, st.stop_sequence, s.stop_name
         FROM stop_times st
         JOIN stops s ON s.id = st.stop_id
         ORDER BY st.id",
    )
    .fetch_all(pool)
    .await?;

    Ok(stop_times)
}

pub async fn get_stop_time(id: i64, pool: &Pool<Sqlite>) -> Result<Option<StopTimeRow>, Error> {
    let stop_time = query_as::<_, StopTimeRow>(
        "SELECT st.id, st.arrival_time, st.stop_sequence, s.stop_name
         FROM stop_times st
         JOIN stops s ON s.id = st.stop_id
         WHERE st.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(stop_time)
}

pub async fn get_stop_times_for_journey(
    journey_id: i64,
    pool: &Pool<Sqlite>,
) -> Result<Vec<StopTimeRow>, Error> {
    let stop_times = query_as::<_, StopTimeRow>(
        "SELECT st.id, st.arrival_time, st.stop_sequence, s.stop_name
         FROM stop_times st
         JOIN stops s ON s.id = st.stop_id
         WHERE st.journey_id = ?
         ORDER BY st.stop_sequence",
    )
    .bind(journey_id)
    .fetch_all(pool)
    .await?;

    Ok(stop_times)
}

/// Distinct stop names appearing in a route's journeys, ordered by their
/// stored sequence position.
pub async fn get_route_stop_names(
    route_id: i64,
    pool: &Pool<Sqlite>,
) -> Result<Vec<String>, Error> {
    let names = query_scalar::<_, String>(
        "SELECT s.stop_name
         FROM stops s
         JOIN stop_times st ON st.stop_id = s.id
         JOIN journeys j ON j.id = st.journey_id
         WHERE j.route_id = ?
         GROUP BY s.stop_name
         ORDER BY MIN(st.stop_sequence)",
    )
    .bind(route_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}
