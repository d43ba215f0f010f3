//! Binary entry point for the HL7 bridge.
//!
//! Loads settings from the environment, connects to the bus, and runs the
//! MLLP listener until interrupted. Every startup failure (missing
//! configuration, unreachable bus, unbindable address) terminates the
//! process with a nonzero exit.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hl7_bridge::{BridgeServer, BusConnection, NatsForwarder, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;
    info!(
        tenant = %settings.tenant,
        timezone = %settings.timezone,
        subject = %settings.subject(),
        "configuration loaded"
    );

    let bus = BusConnection::connect(&settings.bus_url).await?;
    info!(url = %settings.bus_url, "connected to bus");

    let forwarder = Arc::new(NatsForwarder::new(bus, settings.subject()));
    let server = BridgeServer::new(forwarder).bind(settings.bind_addr())?;
    info!(addr = %settings.bind_addr(), "listening for MLLP connections");
    server.run().await?;
    Ok(())
}
