use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use log::info;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use isocontour::config::Params;
use isocontour::contour::ExtractionStats;
use isocontour::error::EmptyResultError;
use isocontour::grid::ScalarGrid;
use isocontour::io::GridDocument;
use isocontour::mesh::ContourMesh;
use isocontour::render;
use isocontour::stitch::Polyline;

#[derive(Deserialize)]
struct ContourRequest {
    grid: GridDocument,
    isovalue: f64,
    parallel: Option<bool>,
    stitch_tolerance: Option<f64>,
    // Preview
    preview: Option<bool>,
    preview_scale: Option<usize>,
}

#[derive(Serialize)]
struct ContourResponse {
    mesh: ContourMesh,
    polylines: Vec<Polyline>,
    stats: ExtractionStats,
    empty: Option<EmptyResultError>,
    preview: Option<String>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

fn unprocessable(e: impl std::fmt::Display) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

fn run(req: ContourRequest) -> Result<ContourResponse, ApiError> {
    let defaults = Params::default();
    let params = Params {
        parallel: req.parallel.unwrap_or(defaults.parallel),
        stitch_tolerance: req.stitch_tolerance.unwrap_or(defaults.stitch_tolerance),
        preview_scale: req.preview_scale.unwrap_or(defaults.preview_scale),
        ..defaults
    };

    let grid = ScalarGrid::try_from(req.grid).map_err(unprocessable)?;
    let (extraction, timings) =
        isocontour::extract(&grid, req.isovalue, &params).map_err(unprocessable)?;

    let preview = if req.preview.unwrap_or(false) {
        let png = render::render_preview(&grid, &extraction.mesh, &params)
            .map_err(unprocessable)?
            .encode_png()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
        Some(format!("data:image/png;base64,{}", b64))
    } else {
        None
    };

    let empty = extraction.empty_result();
    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(ContourResponse {
        mesh: extraction.mesh,
        polylines: extraction.polylines,
        stats: extraction.stats,
        empty,
        preview,
        timings: timing_entries,
    })
}

async fn contour_handler(
    Json(req): Json<ContourRequest>,
) -> Result<Json<ContourResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || run(req))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    Ok(Json(response))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Router::new()
        .route("/api/contour", post(contour_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("isocontour server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
