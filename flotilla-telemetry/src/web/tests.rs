use anyhow::Result;
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::fleet_page::{self, AppState, StatusUpdate, VehicleRowViewModel};
use crate::config::SimulationConfig;
use crate::fleet::{roster, EngineStatus, FleetRegistry, Vehicle, VehicleStatus};
use crate::sim::{MotionSimulator, TelemetryEngine, VehicleTelemetry};

static TRACING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt().with_test_writer().init();
});

fn test_state() -> Result<AppState> {
    LazyLock::force(&TRACING);

    let registry = FleetRegistry::new();
    registry.replace_all(roster::demo_fleet())?;

    let config = SimulationConfig {
        enabled: true,
        tick_interval_ms: 1000,
        frame_interval_ms: 16,
        evict_after_ticks: 0,
    };
    let engine =
        TelemetryEngine::with_simulator(config, MotionSimulator::new(SmallRng::seed_from_u64(3)));
    engine.sync_fleet(&registry.snapshot()?)?;
    engine.tick(Utc::now())?;

    Ok(AppState { registry, engine })
}

#[test]
fn vehicle_row_formats_telemetry() {
    let vehicle = roster::demo_fleet().remove(1);
    let telemetry = VehicleTelemetry {
        vehicle_id: vehicle.id.clone(),
        latitude: 12.9716,
        longitude: 77.5946,
        speed: 42.4,
        heading: 270.0,
        fuel_level: 87.6,
        battery_level: None,
        engine_status: EngineStatus::On,
        timestamp: Utc::now(),
    };

    let row = VehicleRowViewModel::build(&vehicle, Some(&telemetry));

    assert_eq!(row.name, "Innova Crysta #002");
    assert_eq!(row.kind, "VAN");
    assert_eq!(row.status, "IN_USE");
    assert_eq!(row.driver, "Derek Driver");
    assert_eq!(row.speed, "42 km/h");
    assert_eq!(row.heading, "270\u{b0}");
    assert_eq!(row.fuel, "87.6%");
    assert_eq!(row.battery, "-");
    assert_eq!(row.engine, "ON");
    assert_eq!(row.position, "12.971600, 77.594600");
}

#[test]
fn vehicle_row_for_untracked_vehicle() {
    let vehicle = roster::demo_fleet().remove(6);

    let row = VehicleRowViewModel::build(&vehicle, None);

    assert_eq!(row.name, "TVS Jupiter #007");
    assert_eq!(row.status, "OFFLINE");
    assert_eq!(row.driver, "-");
    assert_eq!(row.speed, "-");
    assert_eq!(row.position, "not tracked");
}

#[test]
fn status_update_decodes() -> Result<()> {
    let update: StatusUpdate = serde_json::from_str(r#"{"status":"IN_USE"}"#)?;
    assert_eq!(update.status, VehicleStatus::InUse);
    Ok(())
}

#[tokio::test]
async fn api_surface_over_http() -> Result<()> {
    let state = test_state()?;
    let app = fleet_page::routes(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = format!("http://{}", addr);

    // Full fleet snapshot, including the untracked vehicle
    let fleet: Vec<Vehicle> = reqwest::get(format!("{}/api/fleet", base))
        .await?
        .json()
        .await?;
    assert_eq!(fleet.len(), 8);

    // Telemetry map only covers simulated vehicles
    let telemetry: HashMap<String, VehicleTelemetry> =
        reqwest::get(format!("{}/api/telemetry", base))
            .await?
            .json()
            .await?;
    assert_eq!(telemetry.len(), 7);
    assert!(telemetry.contains_key("v1"));
    assert!(!telemetry.contains_key("v7"));

    let positions: HashMap<String, (f64, f64)> =
        reqwest::get(format!("{}/api/positions", base))
            .await?
            .json()
            .await?;
    assert_eq!(positions.len(), 7);

    let single = reqwest::get(format!("{}/api/telemetry/v1", base)).await?;
    assert_eq!(single.status(), reqwest::StatusCode::OK);
    let single: VehicleTelemetry = single.json().await?;
    assert_eq!(single.vehicle_id, "v1");

    // Untracked and unknown ids are 404s
    let response = reqwest::get(format!("{}/api/telemetry/v7", base)).await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let response = reqwest::get(format!("{}/api/positions/ghost", base)).await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    // Flipping a status is visible in the response and the registry
    let client = reqwest::Client::new();
    let updated: Vehicle = client
        .put(format!("{}/api/vehicles/v1/status", base))
        .json(&serde_json::json!({ "status": "IN_USE" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated.status, VehicleStatus::InUse);

    let response = client
        .put(format!("{}/api/vehicles/ghost/status", base))
        .json(&serde_json::json!({ "status": "OFFLINE" }))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    Ok(())
}
