use anyhow::{Error, bail};
use sqlx::{Pool, Sqlite, Transaction, query_as};

use crate::model::db_model::JourneyDb;

/// Find a journey by its unique code, inserting it first if it does not
/// exist. Journey codes are global, so a code that already belongs to a
/// different route is an error rather than a silent reassignment. Runs on the
/// caller's transaction so the import batch stays all-or-nothing.
pub async fn get_or_create_journey(
    journey_code: &str,
    route_id: i64,
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<JourneyDb, Error> {
    if let Some(journey) = query_as::<_, JourneyDb>(
        "SELECT id, journey_code, route_id FROM journeys WHERE journey_code = ?",
    )
    .bind(journey_code)
    .fetch_optional(&mut **tx)
    .await?
    {
        if journey.route_id != route_id {
            bail!(
                "journey code {journey_code} already belongs to another route (id {})",
                journey.route_id
            );
        }
        return Ok(journey);
    }

    let journey = query_as::<_, JourneyDb>(
        "INSERT INTO journeys (journey_code, route_id) VALUES (?, ?)
         RETURNING id, journey_code, route_id",
    )
    .bind(journey_code)
    .bind(route_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(journey)
}

pub async fn get_journeys(pool: &Pool<Sqlite>) -> Result<Vec<JourneyDb>, Error> {
    let journeys = query_as::<_, JourneyDb>(
        "SELECT id, journey_code, route_id FROM journeys ORDER BY journey_code",
    )
    .fetch_all(pool)
    .await?;

    Ok(journeys)
}

pub async fn get_journey(id: i64, pool: &Pool<Sqlite>) -> Result<Option<JourneyDb>, Error> {
    let journey = query_as::<_, JourneyDb>(
        "SELECT id, journey_code, route_id FROM journeys WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(journey)
}

/// Journeys of one route, ordered by code ascending as the timetable
/// presentation requires.
pub async fn get_journeys_for_route(
    route_id: i64,
    pool: &Pool<Sqlite>,
) -> Result<Vec<JourneyDb>, Error> {
    let journeys = query_as::<_, JourneyDb>(
        "SELECT id, journey_code, route_id FROM journeys
         WHERE route_id = ? ORDER BY journey_code",
    )
    .bind(route_id)
    .fetch_all(pool)
    .await?;

    Ok(journeys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal::routes::get_or_create_route;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn journey_code_cannot_move_between_routes(pool: SqlitePool) {
        let first = get_or_create_route("Route A", &pool).await.unwrap();
        let second = get_or_create_route("Route B", &pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        get_or_create_journey("J1", first.id, &mut tx).await.unwrap();
        let clash = get_or_create_journey("J1", second.id, &mut tx).await;

        assert!(clash.is_err());
    }
}
