use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::telemetry::VehicleTelemetry;
use crate::fleet::vehicle::{EngineStatus, VehicleStatus};

// Service area, roughly greater Bengaluru. Vehicles bounce off these edges.
pub const MIN_LAT: f64 = 12.85;
pub const MAX_LAT: f64 = 13.10;
pub const MIN_LNG: f64 = 77.45;
pub const MAX_LNG: f64 = 77.75;

/// Hard speed cap, km/h.
pub const MAX_SPEED_KMH: f64 = 80.0;
const TARGET_SPEED_MIN_KMH: f64 = 30.0;
const TARGET_SPEED_MAX_KMH: f64 = 70.0;
/// Fraction of the gap to the target speed closed per tick.
const SPEED_EASING: f64 = 0.1;
/// Speed multiplier per tick while idle.
const IDLE_DECAY: f64 = 0.8;
/// Largest course correction per tick, degrees either way.
const HEADING_JITTER_DEG: f64 = 7.5;

/// Seconds of travel applied per tick. Deliberately faster than real time so
/// movement stays visible at city-map zoom.
const TRAVEL_SECS_PER_TICK: f64 = 2.0;
const KM_PER_DEG_LAT: f64 = 111.0;
/// At Bengaluru's latitude.
const KM_PER_DEG_LNG: f64 = 85.0;

const FUEL_BURN_MOVING: f64 = 0.02;
const FUEL_BURN_IDLE: f64 = 0.001;
const BATTERY_DRAIN_MOVING: f64 = 0.03;
const BATTERY_DRAIN_IDLE: f64 = 0.005;
/// Fuel and battery never drop below this reserve.
const RESOURCE_FLOOR: f64 = 5.0;
const RESOURCE_CEIL: f64 = 100.0;

/// Per-tick vehicle kinematics. Pure apart from the injected RNG: the output
/// depends only on the previous record, the operational status, the RNG draws
/// and the supplied clock, so tests drive it with deterministic sources.
#[derive(Debug)]
pub struct MotionSimulator<R: Rng> {
    rng: R,
}

impl MotionSimulator<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> MotionSimulator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Advance one vehicle by one tick.
    ///
    /// Moving vehicles ease toward a wandering target speed, jitter their
    /// heading and travel along it; idle vehicles coast down. Positions are
    /// clamped to the service area and headings reflect off its edges. There
    /// are no failure modes: out-of-range inputs are clamped, never rejected.
    pub fn advance(
        &mut self,
        telemetry: &VehicleTelemetry,
        status: VehicleStatus,
        now: DateTime<Utc>,
    ) -> VehicleTelemetry {
        let moving = status.is_moving();

        let mut latitude = telemetry.latitude;
        let mut longitude = telemetry.longitude;
        let mut speed = telemetry.speed;
        let mut heading = telemetry.heading;

        if moving {
            let target = self
                .rng
                .gen_range(TARGET_SPEED_MIN_KMH..TARGET_SPEED_MAX_KMH);
            speed += (target - speed) * SPEED_EASING;
            speed = speed.clamp(0.0, MAX_SPEED_KMH);

            // Small course corrections, as if following roads
            let jitter = self.rng.gen_range(-HEADING_JITTER_DEG..HEADING_JITTER_DEG);
            heading = (heading + jitter).rem_euclid(360.0);

            let distance_km = speed / 3600.0 * TRAVEL_SECS_PER_TICK;
            let heading_rad = heading.to_radians();
            latitude += heading_rad.cos() * distance_km / KM_PER_DEG_LAT;
            longitude += heading_rad.sin() * distance_km / KM_PER_DEG_LNG;

            latitude = latitude.clamp(MIN_LAT, MAX_LAT);
            longitude = longitude.clamp(MIN_LNG, MAX_LNG);

            // Bounce off the service-area edges
            if latitude <= MIN_LAT || latitude >= MAX_LAT {
                heading = (180.0 - heading).rem_euclid(360.0);
            }
            if longitude <= MIN_LNG || longitude >= MAX_LNG {
                heading = (360.0 - heading).rem_euclid(360.0);
            }
        } else {
            speed = (speed * IDLE_DECAY).max(0.0);
        }

        let fuel_burn = if moving { FUEL_BURN_MOVING } else { FUEL_BURN_IDLE };
        let fuel_level = (telemetry.fuel_level - fuel_burn).clamp(RESOURCE_FLOOR, RESOURCE_CEIL);

        let battery_drain = if moving {
            BATTERY_DRAIN_MOVING
        } else {
            BATTERY_DRAIN_IDLE
        };
        let battery_level = telemetry
            .battery_level
            .map(|level| (level - battery_drain).clamp(RESOURCE_FLOOR, RESOURCE_CEIL));

        VehicleTelemetry {
            vehicle_id: telemetry.vehicle_id.clone(),
            latitude,
            longitude,
            speed,
            heading,
            fuel_level,
            battery_level,
            engine_status: if moving {
                EngineStatus::On
            } else {
                EngineStatus::Off
            },
            timestamp: now,
        }
    }
}
