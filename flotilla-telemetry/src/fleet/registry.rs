use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::vehicle::{Vehicle, VehicleStatus};

#[derive(Debug, Default)]
struct RegistryState {
    vehicles: HashMap<String, Vehicle>,
    // Feed delivery order, preserved for snapshots
    order: Vec<String>,
}

/// Shared registry of the currently known fleet. The feed replaces its
/// contents on refresh; the web layer reads snapshots and updates statuses.
#[derive(Debug, Clone, Default)]
pub struct FleetRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole registry with a freshly fetched vehicle list.
    /// Vehicles delivered without an id are assigned one.
    pub fn replace_all(&self, vehicles: Vec<Vehicle>) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        state.vehicles.clear();
        state.order.clear();
        for mut vehicle in vehicles {
            if vehicle.id.is_empty() {
                vehicle.id = Uuid::new_v4().to_string();
            }
            if !state.vehicles.contains_key(&vehicle.id) {
                state.order.push(vehicle.id.clone());
            }
            state.vehicles.insert(vehicle.id.clone(), vehicle);
        }
        Ok(())
    }

    pub fn upsert(&self, mut vehicle: Vehicle) -> Result<String> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        if vehicle.id.is_empty() {
            vehicle.id = Uuid::new_v4().to_string();
        }
        let id = vehicle.id.clone();
        if !state.vehicles.contains_key(&id) {
            state.order.push(id.clone());
        }
        state.vehicles.insert(id.clone(), vehicle);
        Ok(id)
    }

    /// Returns false when the vehicle is unknown.
    pub fn set_status(&self, vehicle_id: &str, status: VehicleStatus) -> Result<bool> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        match state.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get(&self, vehicle_id: &str) -> Result<Option<Vehicle>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state.vehicles.get(vehicle_id).cloned())
    }

    pub fn status_of(&self, vehicle_id: &str) -> Result<Option<VehicleStatus>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state.vehicles.get(vehicle_id).map(|vehicle| vehicle.status))
    }

    /// Ordered snapshot of the fleet, in feed delivery order.
    pub fn snapshot(&self) -> Result<Vec<Vehicle>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.vehicles.get(id).cloned())
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        Ok(state.vehicles.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
