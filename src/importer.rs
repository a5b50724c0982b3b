//! Turns a spreadsheet-exported timetable grid into relational records.
//!
//! The grid's first row holds journey codes; every following row is
//! `[stop_name, time_1, time_2, ...]` with the time for header column `i`
//! sitting at cell `i + 1`. The whole grid is materialized before any cell is
//! resolved because cells are addressed by (stop row, journey column) pairs
//! across the full header x rows cross product.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveTime;
use csv::StringRecord;
use itertools::Itertools;
use sqlx::{Pool, Sqlite};
use thiserror::Error;
use tracing::{info, warn};

use crate::dal::{
    delete_stop_times_for_route, get_or_create_journey, get_or_create_route, get_or_create_stop,
    insert_stop_times,
};
use crate::model::db_model::{NewStopTime, StopDb};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file not found at {}", .0.display())]
    FileNotFound(PathBuf),
    /// Any other failure. The import transaction is rolled back; no stop
    /// times from the run are committed.
    #[error("import failed: {0}")]
    Failed(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct ImportSummary {
    pub route_name: String,
    pub journeys: usize,
    pub stops: usize,
    pub stop_times: usize,
}

/// Imports one timetable grid under the given route name. Route, stops and
/// journeys are get-or-created; the route's stop times are replaced inside a
/// single all-or-nothing transaction.
#[tracing::instrument(err, skip(pool))]
pub async fn import_timetable_from_csv(
    pool: &Pool<Sqlite>,
    path: &Path,
    route_name: &str,
) -> Result<ImportSummary, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }

    let (journey_codes, rows) = read_grid(path)?;

    let route = get_or_create_route(route_name, pool)
        .await
        .context("creating route")?;

    // (stop, grid row index); the row index doubles as the 0-based sequence.
    let mut stops: Vec<(StopDb, usize)> = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let stop_name = row.get(0).map(str::trim).unwrap_or("");
        if stop_name.is_empty() {
            warn!("skipping row {} with no stop name", row_index + 1);
            continue;
        }
        let stop = get_or_create_stop(stop_name, pool)
            .await
            .context("creating stop")?;
        stops.push((stop, row_index));
    }

    let mut tx = pool.begin().await.context("opening import transaction")?;

    let replaced = delete_stop_times_for_route(route.id, &mut tx).await?;
    if replaced > 0 {
        info!("replacing {replaced} existing stop times for route {route_name}");
    }

    let mut stop_times = Vec::with_capacity(journey_codes.len() * stops.len());
    for (column, journey_code) in journey_codes.iter().enumerate() {
        let journey = get_or_create_journey(journey_code, route.id, &mut tx).await?;

        for (stop, row_index) in &stops {
            let cell = rows[*row_index].get(column + 1);
            let arrival_time = parse_time_cell(cell, journey_code, &stop.stop_name);

            stop_times.push(NewStopTime {
                journey_id: journey.id,
                stop_id: stop.id,
                arrival_time,
                stop_sequence: (*row_index + 1) as i64,
            });
        }
    }

    insert_stop_times(&stop_times, &mut tx).await?;

    tx.commit().await.context("committing import transaction")?;

    Ok(ImportSummary {
        route_name: route.route_name,
        journeys: journey_codes.len(),
        stops: stops.len(),
        stop_times: stop_times.len(),
    })
}

/// Reads the header and materializes every data row. Rows may be ragged;
/// missing cells read back as no service.
fn read_grid(path: &Path) -> Result<(Vec<String>, Vec<StringRecord>), anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let journey_codes = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
        .collect_vec();

    if journey_codes.is_empty() {
        anyhow::bail!("timetable grid has no journey codes in its header row");
    }

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .context("reading grid rows")?;

    Ok((journey_codes, rows))
}

/// `-`, empty and missing cells mean no service. A malformed time is reported
/// and recorded as no service rather than aborting the run.
fn parse_time_cell(cell: Option<&str>, journey_code: &str, stop_name: &str) -> Option<NaiveTime> {
    let raw = cell.map(str::trim).unwrap_or("");
    if raw.is_empty() || raw == "-" {
        return None;
    }

    match NaiveTime::parse_from_str(raw, "%H:%M") {
        Ok(time) => Some(time),
        Err(_) => {
            warn!(
                "Could not parse time '{raw}' for journey {journey_code} at stop {stop_name}, \
                 recording no service"
            );
            None
        }
    }
}
