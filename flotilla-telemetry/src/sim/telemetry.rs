use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fleet::vehicle::{EngineStatus, Vehicle};

/// One simulated telemetry record for a vehicle. This is the wire shape
/// served by the telemetry endpoints, so field names stay camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTelemetry {
    pub vehicle_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h
    pub speed: f64,
    /// Degrees clockwise from north, in [0, 360)
    pub heading: f64,
    /// Percent, floored at the reserve level
    pub fuel_level: f64,
    /// Percent, only present for electric vehicles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    pub engine_status: EngineStatus,
    pub timestamp: DateTime<Utc>,
}

impl VehicleTelemetry {
    /// Initial record for a vehicle that has not been simulated yet.
    /// Vehicles delivered without a position cannot be tracked.
    pub fn at_rest(vehicle: &Vehicle, now: DateTime<Utc>) -> Option<Self> {
        let (latitude, longitude) = vehicle.position()?;
        let engine_status = if vehicle.status.is_moving() {
            EngineStatus::On
        } else {
            EngineStatus::Off
        };
        Some(Self {
            vehicle_id: vehicle.id.clone(),
            latitude,
            longitude,
            speed: 0.0,
            heading: 0.0,
            fuel_level: 100.0,
            battery_level: if vehicle.is_electric() {
                Some(100.0)
            } else {
                None
            },
            engine_status,
            timestamp: now,
        })
    }
}
