pub mod feed;
pub mod registry;
pub mod roster;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use registry::FleetRegistry;
pub use vehicle::{EngineStatus, FuelType, Vehicle, VehicleKind, VehicleStatus};
