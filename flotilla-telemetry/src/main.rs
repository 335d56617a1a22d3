use anyhow::Result;

use flotilla_common::util;
use flotilla_telemetry::config::CONFIG;
use flotilla_telemetry::fleet::feed::FleetFeed;
use flotilla_telemetry::fleet::FleetRegistry;
use flotilla_telemetry::sim::TelemetryEngine;
use flotilla_telemetry::web::fleet_page::AppState;
use flotilla_telemetry::web::server::WebServer;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    util::setup_logging(&CONFIG.log_level, "flotilla_telemetry");
    info!("Telemetry service starting...");
    info!("Fleet: {}", util::get_fleet_id(&CONFIG.base));

    // Create a shutdown signal channel
    let (shutdown_tx, _) = broadcast::channel(1);

    let registry = FleetRegistry::new();
    let engine = TelemetryEngine::new(CONFIG.simulation.clone());

    // Spawn all services
    let engine_handle = spawn_telemetry_engine(engine.clone(), shutdown_tx.subscribe()).await;

    let feed = FleetFeed::new(CONFIG.fleet.clone(), registry.clone(), engine.clone());
    let feed_handle = spawn_fleet_feed(feed, shutdown_tx.subscribe()).await;

    let state = AppState { registry, engine };
    let web_handle = spawn_web_server(state, shutdown_tx.subscribe()).await;

    let shutdown_signal = async {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping services...");
                shutdown_tx
                    .send(())
                    .expect("Failed to send shutdown signal");
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    };

    let results = tokio::join!(engine_handle, feed_handle, web_handle, shutdown_signal);

    for (result, name) in [results.0, results.1, results.2]
        .into_iter()
        .zip(["Telemetry engine", "Fleet feed", "Web server"])
    {
        if let Err(e) = result {
            error!("{} join error: {}", name, e);
        }
    }

    info!("All services stopped, shutting down");

    Ok(())
}

async fn spawn_telemetry_engine(
    engine: TelemetryEngine,
    shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    info!("Starting telemetry engine...");
    tokio::spawn(async move {
        if let Err(e) = engine.run(shutdown).await {
            error!("Telemetry engine error: {}", e);
        }
    })
}

async fn spawn_fleet_feed(
    feed: FleetFeed,
    shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    info!("Starting fleet feed...");
    tokio::spawn(async move {
        if let Err(e) = feed.run(shutdown).await {
            error!("Fleet feed error: {}", e);
        }
    })
}

async fn spawn_web_server(
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let web = WebServer::new(state);
    tokio::spawn(async move {
        tokio::select! {
            result = web.start() => {
                if let Err(e) = result {
                    error!("Web server error: {}", e);
                }
            }
            _ = shutdown.recv() => {
                info!("Shutting down web server...");
                web.stop();
            }
        }
    })
}
