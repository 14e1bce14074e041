//! Attendance engine HTTP server.
//!
//! Run with: ATTENDANCE_CONFIG_DIR=./config/standard ATTENDANCE_BIND=0.0.0.0:8080 attendance-engine

use std::env;

use attendance_engine::api::{create_router, AppState};
use attendance_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/standard";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("attendance_engine=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_dir = env::var("ATTENDANCE_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let bind = env::var("ATTENDANCE_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        leave_rules = config.config().leave_rules().len(),
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(address = %bind, "Attendance engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}
