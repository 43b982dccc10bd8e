//! slbridge - standalone IRC bridge
//!
//! Loads a TOML configuration, connects, and runs until Ctrl-C.

use slirc_bridge::config::validation::describe;
use slirc_bridge::config::validate;
use slirc_bridge::{Bridge, Config, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    telemetry::init(&config.logging.filter);

    if let Err(errors) = validate(&config) {
        error!(path = %config_path, errors = %describe(&errors), "Invalid configuration");
        return Err(anyhow::anyhow!(
            "invalid configuration in {config_path}: {}",
            describe(&errors)
        ));
    }

    info!(
        server = %config.server.address,
        port = config.server.port,
        channel = %config.identity.channel,
        "Starting slbridge"
    );

    let bridge = Bridge::standalone(config);
    bridge.start().await;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    bridge.stop().await;

    Ok(())
}
