use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use paddock::{cli::config_path_from_args, config::Config, logging, server, warden::Warden};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path_from_args()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let logging_guard = logging::init_tracing(&config.logging)?;
    tracing::info!(
        target: "paddock",
        run_id = %logging_guard.run_id(),
        "facility_starting"
    );

    let warden = Arc::new(Mutex::new(Warden::new()));
    server::run(&config.server, warden).await
}
