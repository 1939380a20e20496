use std::env;
use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use foundation::Coordinate;
use foundation::math::path_length_m;
use geometry::{measure, PolylineMetaRequest, DEFAULT_MARKER_STEP_M, POLYLINE_META_PATH};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Steps below this are raised to it.
const MIN_MARKER_STEP_M: u32 = 10;
/// Requests whose path would produce more markers than this are rejected.
const MAX_MARKERS: f64 = 100_000.0;

#[derive(Clone, Copy, Debug)]
struct AppState {
    marker_step_m: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("GEOMETRY_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:47837".to_string())
        .parse()
        .map_err(|err| format!("invalid GEOMETRY_ADDR: {err}"))?;

    let state = AppState {
        marker_step_m: marker_step(env_var_u32(
            "GEOMETRY_MARKER_STEP_M",
            DEFAULT_MARKER_STEP_M,
        )),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "geometry server listening on http://{addr} (marker step {} m)",
        state.marker_step_m
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(POLYLINE_META_PATH, post(polyline_meta))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn polyline_meta(
    State(state): State<AppState>,
    Json(req): Json<PolylineMetaRequest>,
) -> Response {
    if let Some(bad) = req.waypoints.iter().find(|c| !is_valid(c)) {
        warn!("rejecting waypoint out of range: {bad:?}");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "waypoint out of range: latitude {} longitude {}",
                bad.latitude, bad.longitude
            ),
        )
            .into_response();
    }

    let expected_markers = path_length_m(&req.waypoints) / f64::from(state.marker_step_m);
    if expected_markers > MAX_MARKERS {
        warn!("rejecting polyline needing {expected_markers:.0} markers");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("polyline too long: at most {MAX_MARKERS} markers per request"),
        )
            .into_response();
    }

    let summary = measure(&req.waypoints, state.marker_step_m);
    debug!(
        "polyline of {} waypoints: {} m, {} markers",
        req.waypoints.len(),
        summary.length,
        summary.distance_markers.len()
    );
    (StatusCode::OK, Json(summary)).into_response()
}

fn is_valid(c: &Coordinate) -> bool {
    c.latitude.is_finite()
        && c.longitude.is_finite()
        && (-90.0..=90.0).contains(&c.latitude)
        && (-180.0..=180.0).contains(&c.longitude)
}

fn marker_step(configured: u32) -> u32 {
    if configured < MIN_MARKER_STEP_M {
        warn!("marker step {configured} m is below {MIN_MARKER_STEP_M} m, using the minimum");
        return MIN_MARKER_STEP_M;
    }
    configured
}

fn env_var_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
