//! Arcade server: a Conductor instance with an in-memory reward ledger.
//!
//! Environment:
//! - `CONDUCTOR_BIND`: listen address (default `0.0.0.0:8080`)
//! - `CONDUCTOR_MAX_PLAYERS`: connection cap (default 8)
//! - `RUST_LOG`: log filter (default `conductor=info`)

use conductor::{ArcadeConfig, ConductorServer, MemoryLedger};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

fn config_from_env() -> ArcadeConfig {
    let mut config = ArcadeConfig::default();
    if let Ok(raw) = std::env::var("CONDUCTOR_MAX_PLAYERS") {
        match raw.parse() {
            Ok(max) => config.lobby.max_connections = max,
            Err(e) => tracing::warn!(%raw, error = %e, "ignoring CONDUCTOR_MAX_PLAYERS"),
        }
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    conductor::init_tracing("conductor=info,arcade_server=info");

    let bind = std::env::var("CONDUCTOR_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let config = config_from_env();
    tracing::info!(%bind, max_connections = config.lobby.max_connections, "starting arcade server");

    let server = ConductorServer::builder()
        .bind(&bind)
        .config(config)
        .build(MemoryLedger::new())
        .await?;
    server.run().await?;
    Ok(())
}
