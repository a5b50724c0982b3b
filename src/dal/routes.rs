use anyhow::Error;
use sqlx::{Pool, Sqlite, query_as};

use crate::model::db_model::RouteDb;

/// Find a route by its unique name, inserting it first if it does not exist.
/// Safe to call repeatedly with the same name.
pub async fn get_or_create_route(
    route_name: &str,
    pool: &Pool<Sqlite>,
) -> Result<RouteDb, Error> {
    if let Some(route) =
        query_as::<_, RouteDb>("SELECT id, route_name FROM routes WHERE route_name = ?")
            .bind(route_name)
            .fetch_optional(pool)
            .await?
    {
        return Ok(route);
    }

    let route = query_as::<_, RouteDb>(
        "INSERT INTO routes (route_name) VALUES (?) RETURNING id, route_name",
    )
    .bind(route_name)
    .fetch_one(pool)
    .await?;

    Ok(route)
}

pub async fn get_routes(pool: &Pool<Sqlite>) -> Result<Vec<RouteDb>, Error> {
    let routes =
        query_as::<_, RouteDb>("SELECT id, route_name FROM routes ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(routes)
}

pub async fn get_route(id: i64, pool: &Pool<Sqlite>) -> Result<Option<RouteDb>, Error> {
    let route =
        query_as::<_, RouteDb>("SELECT id, route_name FROM routes WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(route)
}
