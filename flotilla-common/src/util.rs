use crate::config::BaseConfig;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn get_fleet_id(config: &BaseConfig) -> String {
    std::env::var("FLEET_ID").unwrap_or_else(|_| config.fleet_id.clone())
}

pub fn setup_logging(log_level: &str, service: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap())
                .add_directive(format!("{}=debug", service).parse().unwrap())
                .add_directive("hyper=info".parse().unwrap())
                .add_directive("reqwest=info".parse().unwrap()),
        )
        .try_init()
        .expect("Failed to initialize logging");
}
