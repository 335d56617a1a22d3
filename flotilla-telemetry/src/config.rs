use flotilla_common::config::{BaseConfig, LoadConfig};
use once_cell::sync::Lazy;
use serde::Deserialize;

pub static CONFIG: Lazy<TelemetryConfig> =
    Lazy::new(|| TelemetryConfig::load_config("telemetry").expect("Failed to load configuration"));

#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub log_level: String,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub tick_interval_ms: u64,
    pub frame_interval_ms: u64,
    /// Drop a vehicle after this many consecutive ticks out of the visible
    /// set; 0 keeps stale vehicles forever.
    pub evict_after_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_ms: 1000,
            frame_interval_ms: 16,
            evict_after_ticks: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Remote vehicle-listing endpoint; when unset the built-in demo roster
    /// is used.
    pub feed_url: Option<String>,
    pub refresh_interval: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            refresh_interval: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl LoadConfig for TelemetryConfig {}
