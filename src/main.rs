//! DrivePort server — role-based access to a shared Google Drive workspace.
//!
//! Main entry point: loads configuration, initializes logging, and starts
//! the server.

use tracing_subscriber::{EnvFilter, fmt};

use driveport_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let env = std::env::var("DRIVEPORT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!(
        "Starting DrivePort v{} (env: {env})",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = driveport_api::run_server(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
