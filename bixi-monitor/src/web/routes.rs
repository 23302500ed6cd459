//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::station::StationRecord;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/stations", get(list_stations))
        .route("/stations/:name", get(get_station))
        .route("/sensors", get(list_sensors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Refresh phase, last success and last error.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::from_state(&state.reader.state()))
}

async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    Json(StationsResponse::from_state(&state.reader.state()))
}

/// One station by exact name. Names containing `/` must be sent
/// percent-encoded (`%2F`).
async fn get_station(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StationRecord>, AppError> {
    state
        .reader
        .station(&name)
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No data for station: {name}"),
        })
}

/// Every sensor read against the same snapshot.
async fn list_sensors(State(state): State<AppState>) -> Json<SensorsResponse> {
    let snapshot = state.reader.snapshot();
    let sensors = state
        .sensors
        .iter()
        .map(|sensor| SensorReading::read(sensor, &snapshot))
        .collect();
    Json(SensorsResponse { sensors })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };
        debug!(%status, "{message}");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
