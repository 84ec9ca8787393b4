//! Query server for region lookups.
//!
//! Loads a merged dataset once at startup, builds the spatial index and
//! serves point lookups over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use recenso::dataset::{DatasetStore, MONTHLY_AVERAGE_INCOME};
use recenso::pip::{Located, LocatorService, RegionIndex};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Region lookup server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Root directory of the ingested datasets
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Attribute variable id of the merged dataset to serve
    #[arg(long, default_value_t = MONTHLY_AVERAGE_INCOME)]
    variable: u32,
}

struct AppState {
    service: LocatorService,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let store = DatasetStore::new(&args.data_dir);
    let dataset = store
        .load_merged(args.variable)
        .context("Failed to load merged dataset (run `ingest census` first)")?;
    info!(
        "Loaded {} regions for variable {}",
        dataset.len(),
        args.variable
    );

    let index = RegionIndex::build(dataset);
    let state = Arc::new(AppState {
        service: LocatorService::new(index),
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/locate", get(locate_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        regions: state.service.index().dataset().len(),
        polygons: state.service.index().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    regions: usize,
    polygons: usize,
}

/// Point lookup. A point contained by no region is a normal empty result,
/// not an error.
async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateParams>,
) -> Json<LocateResponse> {
    Json(LocateResponse {
        result: state.service.lookup(params.lon, params.lat),
    })
}

#[derive(Deserialize)]
struct LocateParams {
    /// Point longitude
    lon: f64,
    /// Point latitude
    lat: f64,
}

#[derive(Serialize)]
struct LocateResponse {
    result: Option<Located>,
}
