use anyhow::Result;
use std::collections::HashSet;
use uuid::Uuid;

use super::registry::FleetRegistry;
use super::roster;
use super::vehicle::{FuelType, Vehicle, VehicleStatus};

#[test]
fn demo_roster_shape() {
    let fleet = roster::demo_fleet();
    assert_eq!(fleet.len(), 8);

    let ids: HashSet<&str> = fleet.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids.len(), 8, "roster ids must be unique");

    // One vehicle ships without coordinates, one is offline
    let positionless: Vec<&str> = fleet
        .iter()
        .filter(|v| v.position().is_none())
        .map(|v| v.id.as_str())
        .collect();
    assert_eq!(positionless, ["v7"]);
    assert!(fleet.iter().any(|v| v.status == VehicleStatus::Offline));

    // Two drivers are on the road
    let driving: Vec<&Vehicle> = fleet
        .iter()
        .filter(|v| v.status == VehicleStatus::InUse)
        .collect();
    assert_eq!(driving.len(), 2);
    assert!(driving.iter().all(|v| v.assigned_driver.is_some()));

    let electric = fleet.iter().filter(|v| v.is_electric()).count();
    assert_eq!(electric, 2);
    assert!(fleet.iter().all(|v| v.capacity > 0));
}

#[test]
fn replace_all_keeps_feed_order() -> Result<()> {
    let registry = FleetRegistry::new();
    registry.replace_all(roster::demo_fleet())?;

    assert_eq!(registry.len()?, 8);
    let ids: Vec<String> = registry
        .snapshot()?
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, ["v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8"]);

    // A second replace resets the contents entirely
    registry.replace_all(roster::demo_fleet().into_iter().take(2).collect())?;
    assert_eq!(registry.len()?, 2);
    Ok(())
}

#[test]
fn missing_ids_are_assigned() -> Result<()> {
    let registry = FleetRegistry::new();
    let mut vehicle = roster::demo_fleet().remove(0);
    vehicle.id = String::new();

    let id = registry.upsert(vehicle)?;
    assert!(Uuid::parse_str(&id).is_ok());
    assert!(registry.get(&id)?.is_some());
    Ok(())
}

#[test]
fn upsert_replaces_existing_entry() -> Result<()> {
    let registry = FleetRegistry::new();
    registry.replace_all(roster::demo_fleet())?;

    let mut updated = registry.get("v1")?.expect("v1 exists");
    updated.name = "Renamed #001".to_string();
    let id = registry.upsert(updated)?;

    assert_eq!(id, "v1");
    assert_eq!(registry.len()?, 8);
    assert_eq!(registry.get("v1")?.expect("v1 exists").name, "Renamed #001");
    Ok(())
}

#[test]
fn set_status_known_and_unknown() -> Result<()> {
    let registry = FleetRegistry::new();
    registry.replace_all(roster::demo_fleet())?;

    assert!(registry.set_status("v1", VehicleStatus::InUse)?);
    assert_eq!(registry.status_of("v1")?, Some(VehicleStatus::InUse));

    assert!(!registry.set_status("ghost", VehicleStatus::Offline)?);
    assert_eq!(registry.status_of("ghost")?, None);
    Ok(())
}

#[test]
fn vehicle_decodes_feed_json() -> Result<()> {
    let json = r#"{
        "id": "veh-9",
        "name": "Test Rig",
        "type": "VAN",
        "licensePlate": "KA-09-ZZ-9999",
        "model": "Test Van",
        "status": "NEEDS_SERVICE",
        "capacity": 7,
        "fuelType": "DIESEL",
        "assignedDriver": "Asha",
        "latitude": 12.9,
        "longitude": 77.6
    }"#;

    let vehicle: Vehicle = serde_json::from_str(json)?;
    assert_eq!(vehicle.id, "veh-9");
    assert_eq!(vehicle.status, VehicleStatus::NeedsService);
    assert_eq!(vehicle.fuel_type, FuelType::Diesel);
    assert_eq!(vehicle.assigned_driver.as_deref(), Some("Asha"));
    assert_eq!(vehicle.position(), Some((12.9, 77.6)));
    Ok(())
}

#[test]
fn vehicle_decodes_without_optional_fields() -> Result<()> {
    // No id, driver or position: the feed may omit all of them
    let json = r#"{
        "name": "Bare",
        "type": "BIKE",
        "licensePlate": "KA-09-AA-0001",
        "model": "Bare Bike",
        "status": "AVAILABLE",
        "capacity": 1,
        "fuelType": "PETROL"
    }"#;

    let vehicle: Vehicle = serde_json::from_str(json)?;
    assert!(vehicle.id.is_empty());
    assert!(vehicle.assigned_driver.is_none());
    assert!(vehicle.position().is_none());

    // The registry fills the blank id on insert
    let registry = FleetRegistry::new();
    registry.replace_all(vec![vehicle])?;
    let stored = registry.snapshot()?.remove(0);
    assert!(!stored.id.is_empty());
    Ok(())
}

#[test]
fn vehicle_encodes_wire_casing() -> Result<()> {
    let vehicle = roster::demo_fleet().remove(0);
    let value = serde_json::to_value(&vehicle)?;

    assert_eq!(value["type"], "CAR");
    assert_eq!(value["status"], "AVAILABLE");
    assert_eq!(value["fuelType"], "PETROL");
    assert_eq!(value["licensePlate"], "KA-01-AB-1234");
    // Unset driver is omitted, not serialized as null
    assert!(value.get("assignedDriver").is_none());
    Ok(())
}

#[test]
fn status_movement_and_display() {
    assert!(VehicleStatus::InUse.is_moving());
    assert!(!VehicleStatus::Available.is_moving());
    assert!(!VehicleStatus::NeedsService.is_moving());
    assert!(!VehicleStatus::Offline.is_moving());

    assert_eq!(VehicleStatus::InUse.to_string(), "IN_USE");
    assert_eq!(FuelType::Cng.to_string(), "CNG");
}
