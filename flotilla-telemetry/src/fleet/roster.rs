use super::vehicle::{FuelType, Vehicle, VehicleKind, VehicleStatus};

fn vehicle(
    id: &str,
    name: &str,
    kind: VehicleKind,
    license_plate: &str,
    model: &str,
    status: VehicleStatus,
    capacity: u8,
    fuel_type: FuelType,
    position: Option<(f64, f64)>,
) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        license_plate: license_plate.to_string(),
        model: model.to_string(),
        status,
        capacity,
        fuel_type,
        assigned_driver: None,
        latitude: position.map(|(lat, _)| lat),
        longitude: position.map(|(_, lng)| lng),
    }
}

/// Built-in fleet used when no remote feed is configured: eight vehicles
/// spread around Bengaluru. One is delivered without a position and one is
/// offline, so the seeding and status paths both get exercised out of the box.
pub fn demo_fleet() -> Vec<Vehicle> {
    let mut fleet = vec![
        vehicle(
            "v1",
            "Swift Dzire #001",
            VehicleKind::Car,
            "KA-01-AB-1234",
            "Maruti Swift Dzire",
            VehicleStatus::Available,
            4,
            FuelType::Petrol,
            Some((12.9352, 77.6245)),
        ),
        vehicle(
            "v2",
            "Innova Crysta #002",
            VehicleKind::Van,
            "KA-01-CD-5678",
            "Toyota Innova Crysta",
            VehicleStatus::InUse,
            7,
            FuelType::Diesel,
            Some((12.9716, 77.5946)),
        ),
        vehicle(
            "v3",
            "Ather 450X #003",
            VehicleKind::Bike,
            "KA-01-EF-9012",
            "Ather 450X",
            VehicleStatus::Available,
            1,
            FuelType::Electric,
            Some((12.9141, 77.6411)),
        ),
        vehicle(
            "v4",
            "Bajaj RE #004",
            VehicleKind::Auto,
            "KA-01-GH-3456",
            "Bajaj RE Compact",
            VehicleStatus::NeedsService,
            3,
            FuelType::Cng,
            Some((12.9783, 77.5823)),
        ),
        vehicle(
            "v5",
            "Honda City #005",
            VehicleKind::Car,
            "KA-01-IJ-7890",
            "Honda City 2024",
            VehicleStatus::InUse,
            4,
            FuelType::Petrol,
            Some((12.9256, 77.5851)),
        ),
        vehicle(
            "v6",
            "Tata Nexon EV #006",
            VehicleKind::Car,
            "KA-01-KL-2345",
            "Tata Nexon EV",
            VehicleStatus::Available,
            5,
            FuelType::Electric,
            Some((12.9611, 77.6387)),
        ),
        vehicle(
            "v7",
            "TVS Jupiter #007",
            VehicleKind::Bike,
            "KA-01-MN-6789",
            "TVS Jupiter 125",
            VehicleStatus::Offline,
            1,
            FuelType::Petrol,
            None,
        ),
        vehicle(
            "v8",
            "Mahindra XUV700 #008",
            VehicleKind::Van,
            "KA-01-OP-0123",
            "Mahindra XUV700",
            VehicleStatus::Available,
            7,
            FuelType::Diesel,
            Some((12.9896, 77.5514)),
        ),
    ];

    fleet[1].assigned_driver = Some("Derek Driver".to_string());
    fleet[4].assigned_driver = Some("Priya Patel".to_string());
    fleet
}
