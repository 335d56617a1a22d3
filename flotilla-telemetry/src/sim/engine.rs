use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::motion::MotionSimulator;
use super::telemetry::VehicleTelemetry;
use crate::config::SimulationConfig;
use crate::fleet::vehicle::{Vehicle, VehicleStatus};

/// Cubic ease-out, `1 - (1 - p)^3`. Fast out of the segment start and gentle
/// into the endpoint, which hides the tick cadence on the map.
pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(3)
}

/// A vehicle's simulated record plus the animation bookkeeping needed to
/// render it between ticks.
#[derive(Debug, Clone)]
struct TrackedVehicle {
    telemetry: VehicleTelemetry,
    /// Start of the current animation segment. None until the first tick.
    prev_position: Option<(f64, f64)>,
    /// 0.0 right after a tick, advanced toward 1.0 by the frame loop.
    animation_progress: f64,
    /// Consecutive ticks this vehicle has been missing from the fleet.
    missed_ticks: u32,
}

impl TrackedVehicle {
    fn render_position(&self) -> (f64, f64) {
        match self.prev_position {
            Some((prev_lat, prev_lng)) => {
                let eased = ease_out_cubic(self.animation_progress);
                (
                    prev_lat + (self.telemetry.latitude - prev_lat) * eased,
                    prev_lng + (self.telemetry.longitude - prev_lng) * eased,
                )
            }
            None => (self.telemetry.latitude, self.telemetry.longitude),
        }
    }

    fn settled(&self) -> bool {
        self.animation_progress >= 1.0
    }
}

#[derive(Debug)]
struct EngineState {
    simulator: MotionSimulator<SmallRng>,
    /// Operational status per vehicle id, as of the last fleet sync.
    statuses: HashMap<String, VehicleStatus>,
    tracked: HashMap<String, TrackedVehicle>,
}

/// Owns the simulated telemetry for every tracked vehicle and drives the two
/// periodic loops: a fixed simulation tick and a fast animation frame. All
/// state sits behind a single lock and every update replaces records
/// wholesale under one write guard, so readers never observe a half-applied
/// tick.
#[derive(Debug, Clone)]
pub struct TelemetryEngine {
    config: SimulationConfig,
    state: Arc<RwLock<EngineState>>,
    running: Arc<AtomicBool>,
}

impl TelemetryEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_simulator(config, MotionSimulator::from_entropy())
    }

    /// Build around a caller-supplied simulator so tests can inject a seeded
    /// RNG and replay identical runs.
    pub fn with_simulator(config: SimulationConfig, simulator: MotionSimulator<SmallRng>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(EngineState {
                simulator,
                statuses: HashMap::new(),
                tracked: HashMap::new(),
            })),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Refresh the visible fleet. Newly seen vehicles with a known position
    /// are seeded at rest; entries that already exist are left alone, so
    /// re-syncing mid-animation never resets anything. Returns the number of
    /// vehicles seeded.
    pub fn sync_fleet(&self, vehicles: &[Vehicle]) -> Result<usize> {
        let now = Utc::now();
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        state.statuses = vehicles
            .iter()
            .map(|vehicle| (vehicle.id.clone(), vehicle.status))
            .collect();

        let mut seeded = 0;
        for vehicle in vehicles {
            if state.tracked.contains_key(&vehicle.id) {
                continue;
            }
            if let Some(telemetry) = VehicleTelemetry::at_rest(vehicle, now) {
                state.tracked.insert(
                    vehicle.id.clone(),
                    TrackedVehicle {
                        telemetry,
                        prev_position: None,
                        animation_progress: 1.0,
                        missed_ticks: 0,
                    },
                );
                seeded += 1;
            }
        }
        if seeded > 0 {
            debug!("Seeded {} new vehicles into the simulation", seeded);
        }
        Ok(seeded)
    }

    /// Advance the simulation by one tick. Every tracked vehicle still in
    /// the visible fleet runs through the simulator; its pre-tick position
    /// becomes the start of a fresh animation segment, even if the previous
    /// segment had not finished rendering. Vehicles missing from the fleet
    /// are carried unchanged and only dropped per the eviction policy.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let EngineState {
            simulator,
            statuses,
            tracked,
        } = &mut *state;

        let evict_after = self.config.evict_after_ticks;
        let mut evicted = Vec::new();

        for (vehicle_id, entry) in tracked.iter_mut() {
            match statuses.get(vehicle_id) {
                Some(status) => {
                    let segment_start = (entry.telemetry.latitude, entry.telemetry.longitude);
                    entry.telemetry = simulator.advance(&entry.telemetry, *status, now);
                    entry.prev_position = Some(segment_start);
                    entry.animation_progress = 0.0;
                    entry.missed_ticks = 0;
                }
                None => {
                    entry.missed_ticks += 1;
                    if evict_after > 0 && entry.missed_ticks >= evict_after {
                        evicted.push(vehicle_id.clone());
                    }
                }
            }
        }

        for vehicle_id in evicted {
            tracked.remove(&vehicle_id);
            info!("Evicted vehicle {} after {} missed ticks", vehicle_id, evict_after);
        }
        Ok(())
    }

    /// Advance every in-flight animation by `delta`, measured against the
    /// tick interval and clamped at 1.0. When every vehicle has settled this
    /// is a read-only no-op.
    pub fn advance_animation(&self, delta: Duration) -> Result<()> {
        {
            let state = self
                .state
                .read()
                .map_err(|e| anyhow!("Lock error: {}", e))?;
            if state.tracked.values().all(TrackedVehicle::settled) {
                return Ok(());
            }
        }

        let increment = delta.as_secs_f64() * 1000.0 / self.config.tick_interval_ms as f64;
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        for entry in state.tracked.values_mut() {
            if !entry.settled() {
                entry.animation_progress = (entry.animation_progress + increment).min(1.0);
            }
        }
        Ok(())
    }

    /// Map-ready position for one vehicle: the eased interpolation between
    /// the last two simulated positions, or the raw position before the
    /// first tick. None for vehicles that never entered the simulation.
    pub fn interpolated_position(&self, vehicle_id: &str) -> Result<Option<(f64, f64)>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state
            .tracked
            .get(vehicle_id)
            .map(TrackedVehicle::render_position))
    }

    /// Map-ready positions for the whole fleet, keyed by vehicle id.
    pub fn positions(&self) -> Result<HashMap<String, (f64, f64)>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state
            .tracked
            .iter()
            .map(|(id, entry)| (id.clone(), entry.render_position()))
            .collect())
    }

    pub fn telemetry(&self, vehicle_id: &str) -> Result<Option<VehicleTelemetry>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state
            .tracked
            .get(vehicle_id)
            .map(|entry| entry.telemetry.clone()))
    }

    /// Current snapshots for the whole fleet, keyed by vehicle id.
    pub fn telemetry_all(&self) -> Result<HashMap<String, VehicleTelemetry>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state
            .tracked
            .iter()
            .map(|(id, entry)| (id.clone(), entry.telemetry.clone()))
            .collect())
    }

    pub fn tracked_count(&self) -> Result<usize> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state.tracked.len())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drive the tick and frame loops until shutdown. Frame increments use
    /// the measured elapsed time rather than the nominal period, so a
    /// delayed frame still lands the right progress. Stopping leaves the
    /// store intact; queries keep serving the last simulated state.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        if !self.config.enabled {
            info!("Simulation disabled, telemetry engine idle");
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);
        info!(
            "Telemetry engine started (tick {}ms, frame {}ms)",
            self.config.tick_interval_ms, self.config.frame_interval_ms
        );

        let mut tick = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        let mut frame = tokio::time::interval(Duration::from_millis(self.config.frame_interval_ms));
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.tick(Utc::now()) {
                        error!("Simulation tick failed: {}", e);
                    }
                }
                _ = frame.tick() => {
                    let now = Instant::now();
                    let delta = now - last_frame;
                    last_frame = now;
                    if let Err(e) = self.advance_animation(delta) {
                        error!("Animation frame failed: {}", e);
                    }
                }
                _ = shutdown.recv() => {
                    info!("Telemetry engine stopping");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}
