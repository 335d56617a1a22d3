use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::registry::FleetRegistry;
use super::roster;
use super::vehicle::Vehicle;
use crate::config::FleetConfig;
use crate::sim::TelemetryEngine;

/// Keeps the registry and the simulation in step with the fleet source,
/// either the built-in demo roster or a remote listing endpoint.
pub struct FleetFeed {
    config: FleetConfig,
    registry: FleetRegistry,
    engine: TelemetryEngine,
}

impl FleetFeed {
    pub fn new(config: FleetConfig, registry: FleetRegistry, engine: TelemetryEngine) -> Self {
        Self {
            config,
            registry,
            engine,
        }
    }

    /// Periodic refresh loop. The interval fires immediately, so the
    /// simulation has vehicles before the web surface comes up.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        match &self.config.feed_url {
            Some(url) => info!("Fleet feed: remote listing at {}", url),
            None => info!("Fleet feed: built-in demo roster"),
        }

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.refresh_interval));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // A failed refresh is logged and skipped; the engine
                    // keeps simulating the last known fleet.
                    if let Err(e) = self.refresh().await {
                        error!("Fleet refresh failed: {}", e);
                    }
                }
                _ = shutdown.recv() => {
                    info!("Fleet feed stopping");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One refresh pass: pull the fleet into the registry, then seed the
    /// simulation with whatever is new.
    pub async fn refresh(&self) -> Result<()> {
        match &self.config.feed_url {
            Some(url) => {
                let vehicles = fetch_fleet(url).await?;
                debug!("Fetched {} vehicles from {}", vehicles.len(), url);
                self.registry.replace_all(vehicles)?;
            }
            None => {
                // Statuses may have been edited through the web surface,
                // so the roster is only loaded once.
                if self.registry.is_empty()? {
                    let fleet = roster::demo_fleet();
                    info!("Loading demo roster ({} vehicles)", fleet.len());
                    self.registry.replace_all(fleet)?;
                }
            }
        }

        let snapshot = self.registry.snapshot()?;
        let seeded = self.engine.sync_fleet(&snapshot)?;
        if seeded > 0 {
            info!("Tracking {} new vehicles", seeded);
        }
        Ok(())
    }
}

async fn fetch_fleet(url: &str) -> Result<Vec<Vehicle>> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch fleet listing from {}", url))?;
    response
        .json::<Vec<Vehicle>>()
        .await
        .context("Failed to decode fleet listing")
}
