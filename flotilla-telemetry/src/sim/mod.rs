pub mod engine;
pub mod motion;
pub mod telemetry;


pub use engine::TelemetryEngine;
pub use motion::MotionSimulator;
pub use telemetry::VehicleTelemetry;
