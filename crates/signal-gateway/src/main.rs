//! Signal Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p signal-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use signal_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        env = ?config.app.env,
        addr = %config.gateway.address(),
        heartbeat_ms = config.heartbeat.interval_ms,
        "Starting Signal Gateway"
    );

    if let Err(e) = signal_gateway::run(config).await {
        error!(error = %e, "Gateway exited with error");
        std::process::exit(1);
    }
}
