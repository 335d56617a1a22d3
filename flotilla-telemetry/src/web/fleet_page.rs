use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use crate::{
    config::CONFIG,
    fleet::{FleetRegistry, Vehicle, VehicleStatus},
    sim::{TelemetryEngine, VehicleTelemetry},
};
use flotilla_common::util;

#[derive(Clone)]
pub struct AppState {
    pub registry: FleetRegistry,
    pub engine: TelemetryEngine,
}

// View Models
#[derive(Debug, Serialize)]
pub struct FleetViewModel {
    pub version: String,
    pub fleet_id: String,
    pub vehicle_count: usize,
    pub tracked_count: usize,
    pub live: bool,
    pub vehicles: Vec<VehicleRowViewModel>,
}

#[derive(Debug, Serialize)]
pub struct VehicleRowViewModel {
    pub name: String,
    pub kind: String,
    pub license_plate: String,
    pub status: String,
    pub driver: String,
    pub speed: String,
    pub heading: String,
    pub fuel: String,
    pub battery: String,
    pub engine: String,
    pub position: String,
}

// Template
#[derive(Template)]
#[template(path = "index.html")]
struct FleetPage {
    fleet: FleetViewModel,
}

impl FleetViewModel {
    fn build(state: &AppState) -> anyhow::Result<Self> {
        let vehicles = state.registry.snapshot()?;
        let telemetry = state.engine.telemetry_all()?;

        let rows = vehicles
            .iter()
            .map(|vehicle| VehicleRowViewModel::build(vehicle, telemetry.get(&vehicle.id)))
            .collect();

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            fleet_id: util::get_fleet_id(&CONFIG.base),
            vehicle_count: vehicles.len(),
            tracked_count: telemetry.len(),
            live: state.engine.is_running(),
            vehicles: rows,
        })
    }
}

impl VehicleRowViewModel {
    pub fn build(vehicle: &Vehicle, telemetry: Option<&VehicleTelemetry>) -> Self {
        let (speed, heading, fuel, battery, engine, position) = match telemetry {
            Some(t) => (
                format!("{:.0} km/h", t.speed),
                format!("{:.0}\u{b0}", t.heading),
                format!("{:.1}%", t.fuel_level),
                match t.battery_level {
                    Some(level) => format!("{:.1}%", level),
                    None => "-".to_string(),
                },
                t.engine_status.to_string(),
                format!("{:.6}, {:.6}", t.latitude, t.longitude),
            ),
            // Vehicles without a seed position are never simulated
            None => (
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "not tracked".to_string(),
            ),
        };

        Self {
            name: vehicle.name.clone(),
            kind: vehicle.kind.to_string(),
            license_plate: vehicle.license_plate.clone(),
            status: vehicle.status.to_string(),
            driver: vehicle
                .assigned_driver
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            speed,
            heading,
            fuel,
            battery,
            engine,
            position,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: VehicleStatus,
}

// Routes and Handlers
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/fleet", get(fleet_api))
        .route("/api/telemetry", get(telemetry_api))
        .route("/api/telemetry/:vehicle_id", get(vehicle_telemetry_api))
        .route("/api/positions", get(positions_api))
        .route("/api/positions/:vehicle_id", get(vehicle_position_api))
        .route("/api/vehicles/:vehicle_id/status", put(set_status_api))
        .with_state(state)
}

fn internal_error(e: anyhow::Error) -> StatusCode {
    error!("Request failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn index_page(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let fleet = FleetViewModel::build(&state).map_err(internal_error)?;
    let template = FleetPage { fleet };
    Ok(Html(template.render().unwrap()))
}

async fn fleet_api(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, StatusCode> {
    state.registry.snapshot().map(Json).map_err(internal_error)
}

async fn telemetry_api(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, VehicleTelemetry>>, StatusCode> {
    state
        .engine
        .telemetry_all()
        .map(Json)
        .map_err(internal_error)
}

async fn vehicle_telemetry_api(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleTelemetry>, StatusCode> {
    state
        .engine
        .telemetry(&vehicle_id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn positions_api(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, (f64, f64)>>, StatusCode> {
    state.engine.positions().map(Json).map_err(internal_error)
}

async fn vehicle_position_api(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<(f64, f64)>, StatusCode> {
    state
        .engine
        .interpolated_position(&vehicle_id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn set_status_api(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Vehicle>, StatusCode> {
    let known = state
        .registry
        .set_status(&vehicle_id, update.status)
        .map_err(internal_error)?;
    if !known {
        return Err(StatusCode::NOT_FOUND);
    }

    // Push the new status into the engine so movement flips on the next
    // tick instead of waiting for the feed refresh
    let snapshot = state.registry.snapshot().map_err(internal_error)?;
    state
        .engine
        .sync_fleet(&snapshot)
        .map_err(internal_error)?;

    state
        .registry
        .get(&vehicle_id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
