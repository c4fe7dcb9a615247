use anyhow::{Context, Result};
use fleetview_geo::config::{FleetViewConfig, LoggingConfig};
use fleetview_geo::services::EnrichmentServices;
use fleetview_geo::web;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(Into::into);
    let config = FleetViewConfig::load_from_path(config_path)?;
    init_tracing(&config.logging)?;

    tracing::info!(version = fleetview_geo::VERSION, "Starting fleetview-geo");

    let services = EnrichmentServices::from_config(&config)?;
    web::run(services, &config.server).await
}
