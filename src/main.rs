use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use importer::ImportError;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

mod api;
mod dal;
mod importer;
mod model;

#[derive(Parser)]
#[command(name = "bus_timetable_api", about = "Bus timetable web backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (the default).
    Serve,
    /// Import a timetable grid from a spreadsheet-exported CSV file.
    Import {
        file: PathBuf,
        #[arg(long, default_value = "Your Bus Route")]
        route_name: String,
    },
    /// Attach coordinates to a stop so it shows up in proximity lookups.
    SetStopLocation {
        stop_name: String,
        latitude: f64,
        longitude: f64,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily("./logs", "bus_timetable_api.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    let console_log = tracing_subscriber::fmt::layer();

    Registry::default()
        .with(console_log)
        .with(file_log)
        .with(env_filter)
        .init();

    let cli = Cli::parse();

    let db_url = dotenvy::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://bus_timetable.db?mode=rwc".to_string());

    let pool = SqlitePool::connect(&db_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr =
                dotenvy::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
            let listener = TcpListener::bind(&addr).await?;
            info!("listening on {addr}");
            axum::serve(listener, api::create_router(pool)).await?;
        }
        Command::Import { file, route_name } => {
            match importer::import_timetable_from_csv(&pool, &file, &route_name).await {
                Ok(summary) => info!(
                    "Timetable data imported successfully! route {}: {} journeys, {} stops, {} stop times",
                    summary.route_name, summary.journeys, summary.stops, summary.stop_times
                ),
                Err(e @ ImportError::FileNotFound(_)) => error!("{e}"),
                Err(e) => error!("An error occurred during import: {e:#}"),
            }
        }
        Command::SetStopLocation {
            stop_name,
            latitude,
            longitude,
        } => {
            if dal::set_stop_location(&stop_name, latitude, longitude, &pool).await? {
                info!("set location of {stop_name} to ({latitude}, {longitude})");
            } else {
                error!("no stop named {stop_name}");
            }
        }
    }

    Ok(())
}
